use crate::{CoreError, CoreResult};

/// Scalar used for pixel coordinates and engineering values.
pub type Real = f64;

/// Absolute and relative slack for float comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// Reject NaN and infinities picked up from hand-entered or mapped values.
pub fn ensure_finite(value: Real, what: &'static str) -> CoreResult<Real> {
    match value.is_finite() {
        true => Ok(value),
        false => Err(CoreError::NonFinite { what, value }),
    }
}

/// Evenly spaced values from `start` to `end`, both inclusive.
///
/// The direction follows the arguments, so `linspace(5800.0, 3500.0, n)` is descending.
/// The last point is pinned to `end` exactly.
pub fn linspace(start: Real, end: Real, num_points: usize) -> Vec<Real> {
    match num_points {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let delta = (end - start) / (n - 1) as Real;
            let mut points: Vec<Real> = (0..n).map(|i| start + i as Real * delta).collect();
            points[n - 1] = end;
            points
        }
    }
}

/// Round to `decimals` places, ties to even.
pub fn round_decimals(value: Real, decimals: i32) -> Real {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Round to the nearest integer, ties to even.
pub fn round_to_int(value: Real) -> i64 {
    value.round_ties_even() as i64
}
