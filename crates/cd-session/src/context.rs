//! Per-session mutable state: current stage, overlay text and cancel reason.
//!
//! One context is created per session and passed by `&mut` through the interaction
//! controller, the calibration sequencer and the orchestrator.

use crate::error::{CancelReason, SessionError};
use tracing::{info, warn};

#[derive(Debug)]
pub struct SessionContext {
    stage: String,
    overlay: Option<String>,
    title: Option<String>,
    cancel_reason: Option<CancelReason>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            stage: "init".to_string(),
            overlay: None,
            title: None,
            cancel_reason: None,
        }
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn set_stage(&mut self, stage: impl Into<String>) {
        self.stage = stage.into();
        info!(stage = %self.stage, "stage changed");
    }

    pub fn overlay(&self) -> Option<&str> {
        self.overlay.as_deref()
    }

    /// Record new overlay text. Returns `false` when it is unchanged.
    pub fn replace_overlay(&mut self, text: &str) -> bool {
        if self.overlay.as_deref() == Some(text) {
            return false;
        }
        self.overlay = Some(text.to_string());
        true
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn replace_title(&mut self, text: &str) -> bool {
        if self.title.as_deref() == Some(text) {
            return false;
        }
        self.title = Some(text.to_string());
        true
    }

    pub fn cancel_reason(&self) -> Option<&CancelReason> {
        self.cancel_reason.as_ref()
    }

    pub fn clear_cancel_reason(&mut self) {
        self.cancel_reason = None;
    }

    /// Record `reason` and build the error that unwinds the session.
    pub fn cancel(&mut self, reason: CancelReason) -> SessionError {
        warn!(stage = %self.stage, reason = %reason, "cancelling session: {reason}");
        self.cancel_reason = Some(reason.clone());
        SessionError::Cancelled(reason)
    }
}
