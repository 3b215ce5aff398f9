//! Curve alignment and resampling.
//!
//! For one IGV setting, the pressure curve (top chart) and the power curve (bottom chart) are
//! digitized independently and rarely cover the same flow span. Both are mapped to engineering
//! units, restricted to their common flow interval and resampled onto one descending flow grid,
//! producing one [`AlignedRow`] per grid point.

use crate::error::{CurveError, CurveResult};
use crate::mapping::{AxisCalibration, map_values};
use crate::pchip::MonotoneCurve;
use cd_core::{PixelPoint, linspace, round_decimals, round_to_int};
use serde::{Deserialize, Serialize};

/// One mapped curve point in engineering units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub flow: f64,
    pub value: f64,
}

/// Map picked pixels to `(flow, metric)` samples, order preserved.
pub fn to_samples(points: &[PixelPoint], calibration: &AxisCalibration) -> Vec<CurveSample> {
    let px: Vec<f64> = points.iter().map(|p| p.x).collect();
    let py: Vec<f64> = points.iter().map(|p| p.y).collect();
    let x = calibration.x;
    let y = calibration.y;
    let flows = map_values(&px, x.pixel1, x.pixel2, x.value1, x.value2);
    let values = map_values(&py, y.pixel1, y.pixel2, y.value1, y.value2);
    flows
        .into_iter()
        .zip(values)
        .map(|(flow, value)| CurveSample { flow, value })
        .collect()
}

/// Closed flow interval shared by two curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowInterval {
    pub q_min: f64,
    pub q_max: f64,
}

fn flow_range(samples: &[CurveSample], curve: &'static str) -> CurveResult<(f64, f64)> {
    if samples.is_empty() {
        return Err(CurveError::EmptyCurve { curve });
    }
    let lo = samples.iter().map(|s| s.flow).fold(f64::INFINITY, f64::min);
    let hi = samples.iter().map(|s| s.flow).fold(f64::NEG_INFINITY, f64::max);
    Ok((lo, hi))
}

/// Intersection of the observed flow ranges of both curves.
///
/// Fails with [`CurveError::NoOverlap`] when `q_max <= q_min`.
pub fn flow_overlap(pressure: &[CurveSample], power: &[CurveSample]) -> CurveResult<FlowInterval> {
    let (p_lo, p_hi) = flow_range(pressure, "pressure")?;
    let (k_lo, k_hi) = flow_range(power, "power")?;
    let q_min = p_lo.max(k_lo);
    let q_max = p_hi.min(k_hi);
    if q_max <= q_min {
        return Err(CurveError::NoOverlap { q_min, q_max });
    }
    Ok(FlowInterval { q_min, q_max })
}

/// `num_points` flows evenly spaced from `q_max` down to `q_min`, both inclusive.
pub fn descending_grid(interval: FlowInterval, num_points: usize) -> Vec<f64> {
    linspace(interval.q_max, interval.q_min, num_points)
}

/// The distinguished operating point that must appear exactly in the base-IGV output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignPoint {
    pub flow: f64,
    /// Only rows for this IGV are snapped.
    pub base_igv: f64,
    /// Maximum distance (exclusive) between a grid flow and `flow` for a snap.
    pub tolerance: f64,
}

impl DesignPoint {
    pub const BASE_IGV: f64 = 0.0;
    pub const DEFAULT_TOLERANCE: f64 = 100.0;

    pub fn new(flow: f64) -> Self {
        Self {
            flow,
            base_igv: Self::BASE_IGV,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }

    pub fn applies_to(&self, igv: f64) -> bool {
        igv == self.base_igv
    }

    /// Overwrite the grid flow nearest to the design flow, if close enough.
    ///
    /// Returns the snapped index. Ties go to the lowest index; other grid points are untouched.
    pub fn snap(&self, grid: &mut [f64]) -> Option<usize> {
        let (idx, dist) = grid
            .iter()
            .map(|q| (q - self.flow).abs())
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            })?;
        if dist < self.tolerance {
            grid[idx] = self.flow;
            Some(idx)
        } else {
            None
        }
    }
}

/// Comment tag carried by an exported row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowTag {
    #[serde(rename = "design_point")]
    DesignPoint,
}

/// One exported record: a resampled point of both curves for one IGV setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    #[serde(rename = "IGV_deg")]
    pub igv: f64,
    #[serde(rename = "Q_Nm3hr")]
    pub flow: i64,
    #[serde(rename = "Pdis_bar_g")]
    pub pressure: f64,
    #[serde(rename = "Power_kW")]
    pub power: f64,
    pub comment: Option<RowTag>,
}

/// Calibrations of both stacked charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartCalibrations {
    /// Top chart: flow vs discharge pressure.
    pub pressure: AxisCalibration,
    /// Bottom chart: flow vs shaft power.
    pub power: AxisCalibration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignOptions {
    pub num_points: usize,
    pub design: DesignPoint,
}

/// Resample one IGV setting's two picked curves onto a shared descending flow grid.
pub fn align_igv(
    igv: f64,
    pressure_points: &[PixelPoint],
    power_points: &[PixelPoint],
    calibrations: &ChartCalibrations,
    options: &AlignOptions,
) -> CurveResult<Vec<AlignedRow>> {
    if options.num_points < 2 {
        return Err(CurveError::InvalidArg {
            what: "num_points must be greater than 1",
        });
    }

    let pressure = to_samples(pressure_points, &calibrations.pressure);
    let power = to_samples(power_points, &calibrations.power);

    let interval = flow_overlap(&pressure, &power)?;
    let mut grid = descending_grid(interval, options.num_points);

    let p_curve = MonotoneCurve::from_points(pressure.iter().map(|s| (s.flow, s.value)), "pressure")?;
    let k_curve = MonotoneCurve::from_points(power.iter().map(|s| (s.flow, s.value)), "power")?;
    let p_interp = p_curve.eval_many(&grid);
    let k_interp = k_curve.eval_many(&grid);

    let mut comments = vec![None; grid.len()];
    if options.design.applies_to(igv) {
        if let Some(idx) = options.design.snap(&mut grid) {
            comments[idx] = Some(RowTag::DesignPoint);
        }
    }

    Ok(grid
        .iter()
        .zip(p_interp)
        .zip(k_interp)
        .zip(comments)
        .map(|(((&q, p), kw), comment)| AlignedRow {
            igv,
            flow: round_to_int(q),
            pressure: round_decimals(p, 2),
            power: round_decimals(kw, 1),
            comment,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(flows: &[f64]) -> Vec<CurveSample> {
        flows
            .iter()
            .map(|&flow| CurveSample { flow, value: 1.0 })
            .collect()
    }

    #[test]
    fn overlap_is_intersection() {
        let a = samples(&[3000.0, 4200.0, 6000.0]);
        let b = samples(&[5800.0, 3500.0]);
        let interval = flow_overlap(&a, &b).unwrap();
        assert_eq!(interval, FlowInterval { q_min: 3500.0, q_max: 5800.0 });

        let grid = descending_grid(interval, 10);
        assert_eq!(grid[0], 5800.0);
        assert_eq!(grid[9], 3500.0);
    }

    #[test]
    fn disjoint_ranges_fail() {
        let a = samples(&[3000.0, 4000.0]);
        let b = samples(&[4500.0, 6000.0]);
        assert!(matches!(
            flow_overlap(&a, &b),
            Err(CurveError::NoOverlap { .. })
        ));
    }

    #[test]
    fn touching_ranges_fail() {
        let a = samples(&[3000.0, 4000.0]);
        let b = samples(&[4000.0, 6000.0]);
        assert!(flow_overlap(&a, &b).is_err());
    }

    #[test]
    fn empty_curve_fails() {
        let err = flow_overlap(&[], &samples(&[1.0, 2.0])).unwrap_err();
        assert_eq!(err, CurveError::EmptyCurve { curve: "pressure" });
    }

    #[test]
    fn snap_overwrites_only_nearest() {
        let design = DesignPoint::new(5776.0);
        let mut grid = vec![5980.0, 5780.0, 5580.0];
        assert_eq!(design.snap(&mut grid), Some(1));
        assert_eq!(grid, vec![5980.0, 5776.0, 5580.0]);
    }

    #[test]
    fn snap_requires_strictly_within_tolerance() {
        let design = DesignPoint::new(5776.0);
        let mut grid = vec![5876.0, 5676.0];
        assert_eq!(design.snap(&mut grid), None);
        assert_eq!(grid, vec![5876.0, 5676.0]);
    }

    #[test]
    fn snap_ties_pick_first_index() {
        let design = DesignPoint::new(5000.0);
        let mut grid = vec![5050.0, 4950.0];
        assert_eq!(design.snap(&mut grid), Some(0));
    }

    #[test]
    fn design_point_only_for_base_igv() {
        let design = DesignPoint::new(5776.0);
        assert!(design.applies_to(0.0));
        assert!(!design.applies_to(20.0));
    }
}
