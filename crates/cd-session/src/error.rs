//! Error types for the digitization session.

use std::fmt;
use std::path::PathBuf;

/// Why a session was cancelled. Cancellation is always fatal to the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReason {
    /// Quit key (Q or Escape) pressed.
    KeyboardQuit,
    /// The window was closed by the user.
    WindowClosed,
    /// The window no longer exists.
    WindowDestroyed,
    /// A numeric input dialog was dismissed without a value.
    InputDismissed,
    /// Neither a text channel nor a dialog could supply a value.
    NoInputChannel,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CancelReason::KeyboardQuit => "user aborted from the keyboard",
            CancelReason::WindowClosed => "window closed",
            CancelReason::WindowDestroyed => "window no longer exists",
            CancelReason::InputDismissed => "numeric input dismissed",
            CancelReason::NoInputChannel => "no numeric input channel available",
        };
        f.write_str(text)
    }
}

/// Session error type shared by the GUI and CLI frontends.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session cancelled: {0}")]
    Cancelled(CancelReason),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calibration incomplete: {what}")]
    IncompleteCalibration { what: &'static str },

    #[error("Failed to write CSV file: {path}")]
    ExportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read replay script: {path}")]
    ScriptRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid replay script: {0}")]
    Script(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Cancelled(_))
    }

    pub fn cancel_reason(&self) -> Option<&CancelReason> {
        match self {
            SessionError::Cancelled(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

impl From<serde_yaml::Error> for SessionError {
    fn from(err: serde_yaml::Error) -> Self {
        SessionError::Script(err.to_string())
    }
}
