use crate::chart_image::ChartImage;
use crate::session_worker::{HostInput, SessionEnd, SessionWorker, WorkerMessage};
use crate::views::{CanvasView, NumberPrompt, WelcomeAction, WelcomeView, pressed_keys};
use cd_session::{CurveTrace, HostKey, RawInput, SessionConfig};
use egui_file_dialog::{DialogState, FileDialog};
use std::path::PathBuf;
use tracing::{info, warn};

const IMAGE_STEP_HINT: &str =
    "Choose the image file (top chart: pressure vs flow, bottom chart: power vs flow; the image must hold both charts stacked).";

pub struct DigitizerApp {
    phase: Phase,
    welcome_view: WelcomeView,
    canvas_view: CanvasView,
    config: Option<SessionConfig>,
    advisories: Vec<String>,
    file_dialog: FileDialog,
    file_dialog_action: Option<FileDialogAction>,
    image: Option<ChartImage>,
    worker: Option<SessionWorker>,
    overlay: String,
    title: String,
    traces: Vec<CurveTrace>,
    number_prompt: Option<NumberPrompt>,
    end: Option<SessionEnd>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Welcome,
    SelectingImage,
    Digitizing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileDialogAction {
    OpenImage,
    SaveCsv,
}

impl DigitizerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            phase: Phase::Welcome,
            welcome_view: WelcomeView::default(),
            canvas_view: CanvasView,
            config: None,
            advisories: Vec::new(),
            file_dialog: FileDialog::new(),
            file_dialog_action: None,
            image: None,
            worker: None,
            overlay: String::new(),
            title: String::new(),
            traces: Vec::new(),
            number_prompt: None,
            end: None,
        }
    }

    fn start_image_selection(&mut self, config: SessionConfig, advisories: Vec<String>) {
        info!(igvs = ?config.igvs, "IGV list: {:?}", config.igvs);
        info!(
            num_points = config.num_points,
            design_flow = config.design_flow,
            "sample count: {}, design flow: {}",
            config.num_points,
            config.design_flow
        );
        for advisory in &advisories {
            warn!("{advisory}");
        }
        self.config = Some(config);
        self.advisories = advisories;

        info!(stage = "select_image", step = "1", "step 1: {IMAGE_STEP_HINT}");
        self.overlay = format!("Step 1:\n{IMAGE_STEP_HINT}");
        self.phase = Phase::SelectingImage;
        self.file_dialog_action = Some(FileDialogAction::OpenImage);
        self.file_dialog.select_file();
    }

    fn open_image(&mut self, ctx: &egui::Context, path: PathBuf) {
        match ChartImage::load(ctx, &path) {
            Ok(image) => {
                self.image = Some(image);
                if let Some(config) = self.config.take() {
                    self.worker = Some(SessionWorker::start(config, ctx.clone()));
                    self.phase = Phase::Digitizing;
                }
            }
            Err(e) => {
                warn!("exit: {e}");
                self.finish(SessionEnd::Failed(e.to_string()));
            }
        }
    }

    fn finish(&mut self, end: SessionEnd) {
        self.title = end.summary();
        self.end = Some(end);
        self.worker = None;
        self.number_prompt = None;
        self.phase = Phase::Finished;
    }

    fn poll_worker(&mut self) {
        let mut finished = None;

        if let Some(worker) = &self.worker {
            while let Ok(msg) = worker.messages.try_recv() {
                match msg {
                    WorkerMessage::Overlay(text) => self.overlay = text,
                    WorkerMessage::Title(text) => self.title = text,
                    WorkerMessage::Trace(trace) => self.traces.push(trace),
                    WorkerMessage::AskNumber {
                        title,
                        prompt,
                        initial,
                    } => {
                        self.number_prompt = Some(NumberPrompt::new(title, prompt, initial));
                    }
                    WorkerMessage::ChooseSavePath { default_name } => {
                        self.file_dialog = FileDialog::new().default_file_name(&default_name);
                        self.file_dialog_action = Some(FileDialogAction::SaveCsv);
                        self.file_dialog.save_file();
                    }
                    WorkerMessage::Finished(end) => {
                        finished = Some(end);
                        break;
                    }
                }
            }
        }

        if let Some(end) = finished {
            // The done step keeps the last overlay and title from the session.
            let title = self.title.clone();
            self.finish(end);
            if !title.is_empty() {
                self.title = title;
            }
        }
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }
        info!(phase = ?self.phase, "window close requested");
        if let Some(worker) = &self.worker {
            worker.send_input(HostInput::CloseRequested);
            if self.number_prompt.take().is_some() {
                worker.answer_number(None);
            }
            if self.file_dialog_action == Some(FileDialogAction::SaveCsv) {
                worker.answer_save_path(None);
            }
        }
    }

    fn update_file_dialog(&mut self, ctx: &egui::Context) {
        self.file_dialog.update(ctx);

        if let Some(path) = self.file_dialog.take_selected() {
            match self.file_dialog_action.take() {
                Some(FileDialogAction::OpenImage) => {
                    info!(path = %path.display(), "image selected");
                    self.open_image(ctx, path);
                }
                Some(FileDialogAction::SaveCsv) => {
                    let mut path = path;
                    if path.extension().is_none() {
                        path.set_extension("csv");
                    }
                    if let Some(worker) = &self.worker {
                        worker.answer_save_path(Some(path));
                    }
                }
                None => {}
            }
            return;
        }

        if matches!(self.file_dialog.state(), DialogState::Cancelled) {
            match self.file_dialog_action.take() {
                Some(FileDialogAction::OpenImage) => {
                    info!("exit: no image selected");
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                Some(FileDialogAction::SaveCsv) => {
                    if let Some(worker) = &self.worker {
                        worker.answer_save_path(None);
                    }
                }
                None => {}
            }
        }
    }

    /// Keys go to the session only when no text field or modal wants them.
    fn forward_keys(&mut self, ctx: &egui::Context) {
        let modal_open = self.number_prompt.is_some() || self.file_dialog_action.is_some();
        let focused = ctx.memory(|m| m.focused().is_some());
        if modal_open || focused {
            return;
        }

        let keys = pressed_keys(ctx);
        match self.phase {
            Phase::Digitizing => {
                if let Some(worker) = &self.worker {
                    for key in keys {
                        worker.send_input(HostInput::Raw(RawInput::Key(key)));
                    }
                }
            }
            Phase::Finished => {
                if keys
                    .iter()
                    .any(|k| matches!(k, HostKey::Escape | HostKey::Char('q')))
                {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
            Phase::Welcome | Phase::SelectingImage => {}
        }
    }

    fn show_status(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            if !self.title.is_empty() {
                ui.heading(&self.title);
            }
            if !self.overlay.is_empty() {
                ui.label(&self.overlay);
            }
            if let Some(end) = &self.end {
                ui.separator();
                ui.label(end.summary());
            }
            for advisory in &self.advisories {
                ui.colored_label(egui::Color32::from_rgb(200, 120, 0), advisory);
            }
        });
    }
}

impl eframe::App for DigitizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();
        self.handle_close_request(ctx);
        self.forward_keys(ctx);

        match self.phase {
            Phase::Welcome => {
                let action = egui::CentralPanel::default()
                    .show(ctx, |ui| self.welcome_view.show(ui))
                    .inner;
                match action {
                    WelcomeAction::Start(config, advisories) => {
                        self.start_image_selection(config, advisories)
                    }
                    WelcomeAction::Cancel => {
                        info!("user cancelled at startup");
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    WelcomeAction::None => {}
                }
            }
            Phase::SelectingImage => {
                self.show_status(ctx);
                egui::CentralPanel::default().show(ctx, |_ui| {});
            }
            Phase::Digitizing | Phase::Finished => {
                self.show_status(ctx);
                let accepts_clicks = self.phase == Phase::Digitizing
                    && self.number_prompt.is_none()
                    && self.file_dialog_action.is_none();

                let clicks = egui::CentralPanel::default()
                    .show(ctx, |ui| match &self.image {
                        Some(image) => self.canvas_view.show(ui, image, &self.traces),
                        None => Vec::new(),
                    })
                    .inner;

                if accepts_clicks {
                    if let Some(worker) = &self.worker {
                        for click in clicks {
                            worker.send_input(HostInput::Raw(click));
                        }
                    }
                }
            }
        }

        if let Some(prompt) = &mut self.number_prompt {
            if let Some(reply) = prompt.show(ctx) {
                self.number_prompt = None;
                if let Some(worker) = &self.worker {
                    worker.answer_number(reply);
                }
            }
        }

        self.update_file_dialog(ctx);
    }
}
