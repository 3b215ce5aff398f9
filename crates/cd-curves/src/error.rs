//! Error types for curve alignment.

use thiserror::Error;

/// Failures that abort processing of a single IGV setting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("Too few points to interpolate {curve} curve: {distinct} distinct flow value(s), need at least 2")]
    InsufficientPoints { curve: &'static str, distinct: usize },

    #[error("Flow ranges do not overlap: q_min={q_min:.3}, q_max={q_max:.3}")]
    NoOverlap { q_min: f64, q_max: f64 },

    #[error("Empty point set for {curve} curve")]
    EmptyCurve { curve: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Numeric error: {message}")]
    Numeric { message: String },
}

pub type CurveResult<T> = Result<T, CurveError>;

impl From<cd_core::CoreError> for CurveError {
    fn from(e: cd_core::CoreError) -> Self {
        CurveError::Numeric {
            message: e.to_string(),
        }
    }
}
