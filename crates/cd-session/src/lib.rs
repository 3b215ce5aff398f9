//! Interactive digitization session for stacked compressor charts.
//!
//! This crate drives the whole workflow independently of any GUI toolkit: the host window is a
//! capability ([`HostWindow`]) that delivers raw input and renders status, and numeric values
//! come from a [`NumericInput`] implementation. Both the egui frontend and the headless replay
//! CLI run the same [`Session`].

pub mod calibration;
pub mod chart;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod export;
pub mod input;
pub mod interaction;
pub mod logging;
pub mod replay;
pub mod session;

// Re-export key types for convenience
pub use calibration::{BOTTOM_STEPS, CalibrationStep, TOP_STEPS, run_calibration};
pub use chart::{ChartKind, CurveTrace, TraceColor, TraceMarker};
pub use config::{
    DEFAULT_DESIGN_FLOW, DEFAULT_IGVS, DEFAULT_NUM_POINTS, SessionConfig, format_igv_list,
    parse_float_value, parse_igv_list, parse_int_value,
};
pub use context::SessionContext;
pub use error::{CancelReason, SessionError, SessionResult};
pub use events::{
    EventQueue, HostKey, HostWindow, InteractionEvent, Liveness, PointerButton, RawInput,
};
pub use export::{
    CSV_HEADER, IgvSummary, read_rows, read_rows_from, summarize, write_rows, write_rows_to,
};
pub use input::{
    DialogInput, FallbackInput, NumericDialog, NumericInput, RawReply, TextChannelInput,
    ValueRequest, obtain_value, select_numeric_input,
};
pub use interaction::{Acquired, Interaction, PickedPointSet, StepPrompt};
pub use logging::{DEFAULT_LOG_FILE, LogOptions, init_logging, install_panic_hook, log_startup};
pub use replay::{
    FixedExportPath, ReplayScript, ReplaySession, ScriptButton, ScriptConfig, ScriptEvent, ScriptedHost,
};
pub use session::{
    DEFAULT_EXPORT_NAME, ExportTarget, Session, SessionOutcome, SessionReport, log_session_end,
};
