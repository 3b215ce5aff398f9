//! cd-core: stable foundation for the curve digitizer.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers + grid/rounding)
//! - geometry (pixel points and axis identifiers)
//! - error (shared error types)

pub mod error;
pub mod geometry;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use geometry::*;
pub use numeric::*;
