//! Log sink setup shared by both frontends.
//!
//! Lines go to stderr and, when configured, are appended to a persistent log file. Both sinks
//! use the same local `YYYY-MM-DD HH:MM:SS` timestamp.

use crate::error::{SessionError, SessionResult};
use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const DEFAULT_LOG_FILE: &str = "run.log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Append-only log file; `None` disables the file sink.
    pub file: Option<PathBuf>,
    pub level: LevelFilter,
    /// Mirror lines to stderr.
    pub console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            level: LevelFilter::INFO,
            console: true,
        }
    }
}

/// Local wall-clock timestamps.
pub struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when another subscriber is already installed (tests, embedding hosts).
pub fn init_logging(options: &LogOptions) -> SessionResult<bool> {
    let file_layer = match &options.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    SessionError::Logging(format!("cannot open log file {}: {e}", path.display()))
                })?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_timer(LocalTimestamp)
                    .with_filter(options.level),
            )
        }
        None => None,
    };

    let console_layer = options.console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(LocalTimestamp)
            .with_filter(options.level)
    });

    Ok(tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok())
}

/// Route panics through `tracing` with a captured backtrace, then run the previous hook.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let backtrace = Backtrace::force_capture();
        error!("unhandled panic: {info}\n{backtrace}");
        previous(info);
    }));
}

/// Startup banner: executable, log file and frontend.
pub fn log_startup(frontend: &str, log_file: Option<&Path>) {
    let exe = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    info!(executable = %exe, "executable: {exe}");
    match log_file {
        Some(path) => info!(log_file = %path.display(), "log file: {}", path.display()),
        None => info!("log file: disabled"),
    }
    info!(frontend, "frontend: {frontend}");
}
