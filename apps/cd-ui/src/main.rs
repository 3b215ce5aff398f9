#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
#![allow(clippy::collapsible_if)]

mod app;
mod chart_image;
mod session_worker;
mod views;

use app::DigitizerApp;
use cd_session::{LogOptions, init_logging, install_panic_hook, log_startup};

fn main() -> eframe::Result<()> {
    let options = LogOptions::default();
    if let Err(e) = init_logging(&options) {
        eprintln!("logging disabled: {e}");
    }
    install_panic_hook();
    log_startup("egui", options.file.as_deref());

    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("Compressor Curve Digitizer"),
        ..Default::default()
    };

    eframe::run_native(
        "Compressor Curve Digitizer",
        native,
        Box::new(|cc| Ok(Box::new(DigitizerApp::new(cc)))),
    )
}
