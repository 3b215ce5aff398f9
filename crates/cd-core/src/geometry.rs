//! Image-space geometry shared by the mapper and the interaction layer.

use std::fmt;

/// A point in image pixel coordinates (column, row).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component along `axis`.
    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Which of the two reference ticks along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_selects_axis() {
        let p = PixelPoint::new(12.0, 340.5);
        assert_eq!(p.component(Axis::X), 12.0);
        assert_eq!(p.component(Axis::Y), 340.5);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(PixelPoint::new(1.0, 2.34).to_string(), "(1.0, 2.3)");
    }
}
