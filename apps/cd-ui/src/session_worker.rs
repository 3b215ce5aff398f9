//! Runs the digitization session on its own thread.
//!
//! The UI thread is the host window: it forwards clicks and keys over a channel and renders
//! whatever the session sends back (overlay, title, traces, dialog requests). No state is
//! shared between the two threads.

use cd_session::{
    CurveTrace, ExportTarget, HostWindow, Liveness, NumericDialog, RawInput, Session,
    SessionConfig, SessionError, SessionOutcome, log_session_end, select_numeric_input,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::error;

/// UI → session.
#[derive(Debug, Clone)]
pub enum HostInput {
    Raw(RawInput),
    CloseRequested,
}

/// Session → UI.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Overlay(String),
    Title(String),
    Trace(CurveTrace),
    AskNumber {
        title: String,
        prompt: String,
        initial: String,
    },
    ChooseSavePath {
        default_name: String,
    },
    Finished(SessionEnd),
}

#[derive(Debug, Clone)]
pub enum SessionEnd {
    Exported { path: PathBuf, rows: usize },
    NotExported { rows: usize },
    Cancelled(String),
    Failed(String),
}

impl SessionEnd {
    pub fn summary(&self) -> String {
        match self {
            SessionEnd::Exported { path, rows } => {
                format!("Exported {rows} rows to {}", path.display())
            }
            SessionEnd::NotExported { rows } => {
                format!("Save cancelled, {rows} rows not exported")
            }
            SessionEnd::Cancelled(reason) => format!("Session cancelled: {reason}"),
            SessionEnd::Failed(message) => format!("Session failed: {message}"),
        }
    }
}

pub struct SessionWorker {
    pub messages: Receiver<WorkerMessage>,
    input_tx: Sender<HostInput>,
    number_tx: Sender<Option<String>>,
    save_tx: Sender<Option<PathBuf>>,
    _handle: JoinHandle<()>,
}

impl SessionWorker {
    pub fn start(config: SessionConfig, egui_ctx: egui::Context) -> Self {
        let (msg_tx, msg_rx) = channel();
        let (input_tx, input_rx) = channel();
        let (number_tx, number_rx) = channel();
        let (save_tx, save_rx) = channel();

        let handle = thread::spawn(move || {
            let ui = UiLink {
                tx: msg_tx,
                ctx: egui_ctx,
            };
            let host = ChannelHost {
                events: input_rx,
                ui: ui.clone(),
                liveness: Liveness::Open,
            };
            let dialog = ChannelDialog {
                ui: ui.clone(),
                replies: number_rx,
            };
            let export = ChannelExport {
                ui: ui.clone(),
                replies: save_rx,
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
                let mut session = Session::new(host, select_numeric_input(dialog), export, config);
                let result = session.run();
                log_session_end(session.context().stage(), &result);
                result
            }));

            let end = match outcome {
                Ok(Ok(report)) => match report.outcome {
                    SessionOutcome::Exported { path, rows } => SessionEnd::Exported { path, rows },
                    SessionOutcome::NotExported { rows } => SessionEnd::NotExported { rows },
                },
                Ok(Err(SessionError::Cancelled(reason))) => SessionEnd::Cancelled(reason.to_string()),
                Ok(Err(e)) => SessionEnd::Failed(e.to_string()),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("exit: session thread panicked: {message}");
                    SessionEnd::Failed(message)
                }
            };
            ui.send(WorkerMessage::Finished(end));
        });

        Self {
            messages: msg_rx,
            input_tx,
            number_tx,
            save_tx,
            _handle: handle,
        }
    }

    pub fn send_input(&self, input: HostInput) {
        let _ = self.input_tx.send(input);
    }

    pub fn answer_number(&self, reply: Option<String>) {
        let _ = self.number_tx.send(reply);
    }

    pub fn answer_save_path(&self, reply: Option<PathBuf>) {
        let _ = self.save_tx.send(reply);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Clone)]
struct UiLink {
    tx: Sender<WorkerMessage>,
    ctx: egui::Context,
}

impl UiLink {
    fn send(&self, message: WorkerMessage) {
        let _ = self.tx.send(message);
        self.ctx.request_repaint();
    }
}

struct ChannelHost {
    events: Receiver<HostInput>,
    ui: UiLink,
    liveness: Liveness,
}

impl ChannelHost {
    fn accept(&mut self, input: HostInput, sink: &mut Vec<RawInput>) {
        match input {
            HostInput::Raw(raw) => sink.push(raw),
            HostInput::CloseRequested => self.liveness = Liveness::Closed,
        }
    }
}

impl HostWindow for ChannelHost {
    fn liveness(&self) -> Liveness {
        self.liveness
    }

    fn pump(&mut self, pause: Duration, sink: &mut Vec<RawInput>) {
        match self.events.recv_timeout(pause) {
            Ok(input) => self.accept(input, sink),
            Err(RecvTimeoutError::Timeout) => return,
            Err(RecvTimeoutError::Disconnected) => {
                self.liveness = Liveness::Destroyed;
                return;
            }
        }
        while let Ok(input) = self.events.try_recv() {
            self.accept(input, sink);
        }
    }

    fn show_overlay(&mut self, text: &str) {
        self.ui.send(WorkerMessage::Overlay(text.to_string()));
    }

    fn set_title(&mut self, text: &str) {
        self.ui.send(WorkerMessage::Title(text.to_string()));
    }

    fn draw_trace(&mut self, trace: &CurveTrace) {
        self.ui.send(WorkerMessage::Trace(trace.clone()));
    }
}

struct ChannelDialog {
    ui: UiLink,
    replies: Receiver<Option<String>>,
}

impl NumericDialog for ChannelDialog {
    fn ask(&mut self, title: &str, prompt: &str, initial: &str) -> Option<String> {
        self.ui.send(WorkerMessage::AskNumber {
            title: title.to_string(),
            prompt: prompt.to_string(),
            initial: initial.to_string(),
        });
        self.replies.recv().ok().flatten()
    }
}

struct ChannelExport {
    ui: UiLink,
    replies: Receiver<Option<PathBuf>>,
}

impl ExportTarget for ChannelExport {
    fn choose_path(&mut self, default_name: &str) -> Option<PathBuf> {
        self.ui.send(WorkerMessage::ChooseSavePath {
            default_name: default_name.to_string(),
        });
        self.replies.recv().ok().flatten()
    }
}
