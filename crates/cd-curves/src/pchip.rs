//! Piecewise cubic Hermite interpolation with Fritsch-Carlson derivatives (PCHIP).
//!
//! Hand-picked curve points are sparse, and a natural cubic spline through them can swing
//! above and below the data. PCHIP picks node derivatives so that each segment stays within
//! the range of its two end values: monotone data gives a monotone interpolant, and local
//! extrema only occur at data points.

use crate::error::{CurveError, CurveResult};
use cd_core::ensure_finite;

/// A shape-preserving interpolant over strictly increasing abscissae.
#[derive(Debug, Clone)]
pub struct MonotoneCurve {
    x: Vec<f64>,
    y: Vec<f64>,
    d: Vec<f64>,
}

impl MonotoneCurve {
    /// Build from unordered `(x, y)` samples.
    ///
    /// Samples are sorted by `x`; when several share an `x` the first one after a stable sort
    /// wins. At least two distinct `x` values are required.
    pub fn from_points<I>(points: I, curve: &'static str) -> CurveResult<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut pts: Vec<(f64, f64)> = Vec::new();
        for (x, y) in points {
            pts.push((ensure_finite(x, "interpolation x")?, ensure_finite(y, "interpolation y")?));
        }
        pts.sort_by(|a, b| a.0.total_cmp(&b.0));
        pts.dedup_by(|later, earlier| later.0 == earlier.0);

        if pts.len() < 2 {
            return Err(CurveError::InsufficientPoints {
                curve,
                distinct: pts.len(),
            });
        }

        let (x, y): (Vec<f64>, Vec<f64>) = pts.into_iter().unzip();
        let d = node_derivatives(&x, &y);
        Ok(Self { x, y, d })
    }

    /// Distinct abscissae after sorting and deduplication.
    pub fn knots(&self) -> &[f64] {
        &self.x
    }

    pub fn derivatives(&self) -> &[f64] {
        &self.d
    }

    /// Evaluate at `xq`. Outside the knot range the end polynomials are extended.
    pub fn eval(&self, xq: f64) -> f64 {
        let n = self.x.len();
        let k = self
            .x
            .partition_point(|&xi| xi <= xq)
            .saturating_sub(1)
            .min(n - 2);

        let h = self.x[k + 1] - self.x[k];
        let t = (xq - self.x[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.y[k] + h10 * h * self.d[k] + h01 * self.y[k + 1] + h11 * h * self.d[k + 1]
    }

    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn node_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let m: Vec<f64> = (0..n - 1).map(|k| (y[k + 1] - y[k]) / h[k]).collect();

    if n == 2 {
        return vec![m[0], m[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (m0, m1) = (m[k - 1], m[k]);
        if m0 == 0.0 || m1 == 0.0 || sign(m0) != sign(m1) {
            d[k] = 0.0;
            continue;
        }
        // Weighted harmonic mean of neighbouring slopes.
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / m0 + w2 / m1);
    }

    d[0] = edge_derivative(h[0], h[1], m[0], m[1]);
    d[n - 1] = edge_derivative(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
    d
}

/// One-sided three-point estimate, limited so the end segment keeps its shape.
fn edge_derivative(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cd_core::{Tolerances, linspace, nearly_equal};
    use proptest::prelude::*;

    const TOL: Tolerances = Tolerances {
        abs: 1e-9,
        rel: 1e-9,
    };

    #[test]
    fn passes_through_knots() {
        let pts = vec![(3000.0, 10.2), (3800.0, 9.6), (4700.0, 8.1), (5600.0, 5.0)];
        let curve = MonotoneCurve::from_points(pts.clone(), "pressure").unwrap();
        for (x, y) in pts {
            assert!(nearly_equal(curve.eval(x), y, TOL));
        }
    }

    #[test]
    fn two_points_are_linear() {
        let curve = MonotoneCurve::from_points([(0.0, 0.0), (10.0, 5.0)], "power").unwrap();
        assert!(nearly_equal(curve.eval(4.0), 2.0, TOL));
        assert!(nearly_equal(curve.eval(12.0), 6.0, TOL));
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let curve =
            MonotoneCurve::from_points([(3.0, 9.0), (1.0, 1.0), (2.0, 4.0)], "pressure").unwrap();
        assert_eq!(curve.knots(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_flow_keeps_first_occurrence() {
        let curve = MonotoneCurve::from_points(
            [(1.0, 1.0), (2.0, 4.0), (2.0, 100.0), (3.0, 9.0)],
            "pressure",
        )
        .unwrap();
        assert_eq!(curve.knots(), &[1.0, 2.0, 3.0]);
        assert!(nearly_equal(curve.eval(2.0), 4.0, TOL));
    }

    #[test]
    fn rejects_single_distinct_flow() {
        let err = MonotoneCurve::from_points([(5.0, 1.0), (5.0, 2.0)], "power").unwrap_err();
        assert_eq!(
            err,
            CurveError::InsufficientPoints {
                curve: "power",
                distinct: 1
            }
        );
    }

    #[test]
    fn rejects_non_finite_samples() {
        let err = MonotoneCurve::from_points([(1.0, f64::NAN), (2.0, 1.0)], "power").unwrap_err();
        assert!(matches!(err, CurveError::Numeric { .. }));
    }

    #[test]
    fn local_extremum_is_flat() {
        let curve =
            MonotoneCurve::from_points([(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], "power").unwrap();
        assert_eq!(curve.derivatives()[1], 0.0);
        // No overshoot above the peak.
        for x in linspace(0.0, 2.0, 41) {
            assert!(curve.eval(x) <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn step_data_does_not_ring() {
        let curve = MonotoneCurve::from_points(
            [(0.0, 0.0), (1.0, 0.0), (2.0, 1.0), (3.0, 1.0)],
            "pressure",
        )
        .unwrap();
        for x in linspace(0.0, 3.0, 61) {
            let v = curve.eval(x);
            assert!((-1e-12..=1.0 + 1e-12).contains(&v), "x={x} v={v}");
        }
    }

    proptest! {
        #[test]
        fn monotone_data_gives_monotone_curve(
            steps in prop::collection::vec((1.0_f64..500.0, 0.0_f64..5.0), 2..8),
        ) {
            let mut x = 3000.0;
            let mut y = 12.0;
            let mut pts = vec![(x, y)];
            for (dx, dy) in steps {
                x += dx;
                y -= dy;
                pts.push((x, y));
            }
            let (lo, hi) = (pts[0].0, pts[pts.len() - 1].0);
            let curve = MonotoneCurve::from_points(pts.clone(), "pressure").unwrap();
            let samples = curve.eval_many(&linspace(lo, hi, 200));
            for w in samples.windows(2) {
                prop_assert!(w[1] <= w[0] + 1e-9);
            }
            let y_max = pts[0].1;
            let y_min = pts[pts.len() - 1].1;
            for v in samples {
                prop_assert!(v <= y_max + 1e-9 && v >= y_min - 1e-9);
            }
        }
    }
}
