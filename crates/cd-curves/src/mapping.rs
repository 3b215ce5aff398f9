//! Two-point linear axis calibration.
//!
//! Each chart axis is calibrated from two reference ticks: the pixel coordinate the user clicked
//! and the engineering value they typed for it. Mapping between the two is affine and
//! extrapolates beyond the reference ticks.

use cd_core::PixelPoint;

/// Map a pixel coordinate to an engineering value.
///
/// ```text
/// value = value1 + (pixel - pixel1) * (value2 - value1) / (pixel2 - pixel1)
/// ```
///
/// When `pixel1 == pixel2` the mapping is constant and returns `value1`.
pub fn map_value(pixel: f64, pixel1: f64, pixel2: f64, value1: f64, value2: f64) -> f64 {
    if pixel1 == pixel2 {
        return value1;
    }
    let scale = (value2 - value1) / (pixel2 - pixel1);
    (pixel - pixel1) * scale + value1
}

/// Vectorized [`map_value`], one output per input, order preserved.
pub fn map_values(pixels: &[f64], pixel1: f64, pixel2: f64, value1: f64, value2: f64) -> Vec<f64> {
    pixels
        .iter()
        .map(|&p| map_value(p, pixel1, pixel2, value1, value2))
        .collect()
}

/// One calibrated axis: two pixel positions and their engineering values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPair {
    pub pixel1: f64,
    pub pixel2: f64,
    pub value1: f64,
    pub value2: f64,
}

impl AxisPair {
    pub fn new(pixel1: f64, pixel2: f64, value1: f64, value2: f64) -> Self {
        Self {
            pixel1,
            pixel2,
            value1,
            value2,
        }
    }

    pub fn map(&self, pixel: f64) -> f64 {
        map_value(pixel, self.pixel1, self.pixel2, self.value1, self.value2)
    }

    /// Both reference pixels coincide, so every pixel maps to `value1`.
    pub fn is_degenerate(&self) -> bool {
        self.pixel1 == self.pixel2
    }
}

/// Calibration of one chart: X maps to flow, Y maps to the chart's metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisCalibration {
    pub x: AxisPair,
    pub y: AxisPair,
}

impl AxisCalibration {
    pub fn new(x: AxisPair, y: AxisPair) -> Self {
        Self { x, y }
    }

    /// Map a clicked pixel to `(flow, metric)`.
    pub fn map_point(&self, point: PixelPoint) -> (f64, f64) {
        (self.x.map(point.x), self.y.map(point.y))
    }
}
