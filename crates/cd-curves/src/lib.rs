//! cd-curves: pixel-to-engineering mapping and curve alignment.
//!
//! Contains:
//! - mapping (two-point axis calibration, pixel -> value)
//! - pchip (shape-preserving monotone cubic interpolation)
//! - align (overlap interval, descending sample grid, design-point snap, aligned rows)
//! - error (alignment failures)

pub mod align;
pub mod error;
pub mod mapping;
pub mod pchip;

pub use align::{
    AlignOptions, AlignedRow, ChartCalibrations, CurveSample, DesignPoint, FlowInterval, RowTag,
    align_igv, descending_grid, flow_overlap, to_samples,
};
pub use error::{CurveError, CurveResult};
pub use mapping::{AxisCalibration, AxisPair, map_value, map_values};
pub use pchip::MonotoneCurve;
