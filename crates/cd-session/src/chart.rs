//! The two stacked charts and how their digitized traces are drawn.

use cd_core::PixelPoint;

/// Which chart of the stacked image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    /// Top chart: discharge pressure vs flow.
    Pressure,
    /// Bottom chart: shaft power vs flow.
    Power,
}

impl ChartKind {
    pub fn position(&self) -> &'static str {
        match self {
            ChartKind::Pressure => "top",
            ChartKind::Power => "bottom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Pressure => "Top chart (pressure vs flow)",
            ChartKind::Power => "Bottom chart (power vs flow)",
        }
    }

    pub fn marker(&self) -> TraceMarker {
        match self {
            ChartKind::Pressure => TraceMarker::Circle,
            ChartKind::Power => TraceMarker::Square,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceMarker {
    Circle,
    Square,
}

/// Per-IGV trace colors, cycled by IGV index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceColor {
    Red,
    Blue,
    Green,
    Magenta,
    Cyan,
    Black,
}

impl TraceColor {
    const CYCLE: [TraceColor; 6] = [
        TraceColor::Red,
        TraceColor::Blue,
        TraceColor::Green,
        TraceColor::Magenta,
        TraceColor::Cyan,
        TraceColor::Black,
    ];

    pub fn for_index(index: usize) -> Self {
        Self::CYCLE[index % Self::CYCLE.len()]
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            TraceColor::Red => [220, 40, 40],
            TraceColor::Blue => [40, 80, 220],
            TraceColor::Green => [30, 160, 60],
            TraceColor::Magenta => [200, 40, 200],
            TraceColor::Cyan => [20, 180, 200],
            TraceColor::Black => [10, 10, 10],
        }
    }
}

/// A finished curve, in pixel coordinates, to be drawn over the image.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveTrace {
    pub chart: ChartKind,
    pub igv: f64,
    pub color: TraceColor,
    pub points: Vec<PixelPoint>,
}

impl CurveTrace {
    pub fn marker(&self) -> TraceMarker {
        self.chart.marker()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_cycle_after_six() {
        assert_eq!(TraceColor::for_index(0), TraceColor::Red);
        assert_eq!(TraceColor::for_index(5), TraceColor::Black);
        assert_eq!(TraceColor::for_index(6), TraceColor::Red);
    }

    #[test]
    fn markers_follow_chart() {
        assert_eq!(ChartKind::Pressure.marker(), TraceMarker::Circle);
        assert_eq!(ChartKind::Power.marker(), TraceMarker::Square);
    }
}
