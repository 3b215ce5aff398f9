//! Axis calibration: four clicks per chart, each followed by the engineering value of the tick.
//!
//! Steps run in a cursor loop. "Back" moves the cursor one step up (never below the first
//! step) so the previous click and value are asked again.

use crate::chart::ChartKind;
use crate::context::SessionContext;
use crate::error::{SessionError, SessionResult};
use crate::events::HostWindow;
use crate::input::{NumericInput, ValueRequest, obtain_value};
use crate::interaction::{Acquired, Interaction, StepPrompt};
use cd_core::{Axis, Endpoint};
use cd_curves::{AxisCalibration, AxisPair};
use tracing::info;

/// One calibration click plus its numeric value.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationStep {
    pub chart: ChartKind,
    pub axis: Axis,
    pub endpoint: Endpoint,
    pub stage: &'static str,
    pub step: &'static str,
    pub overlay: &'static str,
    pub prompt: &'static str,
    pub title: &'static str,
    pub default: f64,
}

impl CalibrationStep {
    fn slot(&self) -> usize {
        let axis = match self.axis {
            Axis::X => 0,
            Axis::Y => 2,
        };
        let end = match self.endpoint {
            Endpoint::Start => 0,
            Endpoint::End => 1,
        };
        axis + end
    }

    /// Overlay text with the click instructions appended.
    pub fn hint(&self) -> String {
        format!(
            "{}\nClick once where the tick mark meets the axis (not on the curve).\nLeft-click = confirm, B = back one step, Q/Esc = abort.",
            self.overlay
        )
    }

    pub fn request(&self) -> ValueRequest {
        ValueRequest::new(self.title, self.prompt, self.default)
    }
}

pub const TOP_STEPS: [CalibrationStep; 4] = [
    CalibrationStep {
        chart: ChartKind::Pressure,
        axis: Axis::X,
        endpoint: Endpoint::Start,
        stage: "calibrate_top_x1",
        step: "2",
        overlay: "Top chart (pressure vs flow) X axis start: click where the leftmost tick meets the axis (minimum flow).",
        prompt: "Top chart X axis start value (e.g. minimum flow 3000):",
        title: "Top chart X axis start value",
        default: 3000.0,
    },
    CalibrationStep {
        chart: ChartKind::Pressure,
        axis: Axis::X,
        endpoint: Endpoint::End,
        stage: "calibrate_top_x2",
        step: "3",
        overlay: "Top chart (pressure vs flow) X axis end: click where the rightmost tick meets the axis (maximum flow).",
        prompt: "Top chart X axis end value (e.g. maximum flow 6000):",
        title: "Top chart X axis end value",
        default: 6000.0,
    },
    CalibrationStep {
        chart: ChartKind::Pressure,
        axis: Axis::Y,
        endpoint: Endpoint::Start,
        stage: "calibrate_top_y1",
        step: "4",
        overlay: "Top chart (pressure vs flow) Y axis start: click where the lowest tick meets the axis (minimum pressure).",
        prompt: "Top chart Y axis start value (e.g. minimum pressure 2):",
        title: "Top chart Y axis start value",
        default: 2.0,
    },
    CalibrationStep {
        chart: ChartKind::Pressure,
        axis: Axis::Y,
        endpoint: Endpoint::End,
        stage: "calibrate_top_y2",
        step: "5",
        overlay: "Top chart (pressure vs flow) Y axis end: click where the highest tick meets the axis (maximum pressure).",
        prompt: "Top chart Y axis end value (e.g. maximum pressure 11):",
        title: "Top chart Y axis end value",
        default: 11.0,
    },
];

pub const BOTTOM_STEPS: [CalibrationStep; 4] = [
    CalibrationStep {
        chart: ChartKind::Power,
        axis: Axis::X,
        endpoint: Endpoint::Start,
        stage: "calibrate_bottom_x1",
        step: "6",
        overlay: "Bottom chart (power vs flow) X axis start: click where the leftmost tick meets the axis (minimum flow).",
        prompt: "Bottom chart X axis start value (e.g. minimum flow 3000):",
        title: "Bottom chart X axis start value",
        default: 3000.0,
    },
    CalibrationStep {
        chart: ChartKind::Power,
        axis: Axis::X,
        endpoint: Endpoint::End,
        stage: "calibrate_bottom_x2",
        step: "7",
        overlay: "Bottom chart (power vs flow) X axis end: click where the rightmost tick meets the axis (maximum flow).",
        prompt: "Bottom chart X axis end value (e.g. maximum flow 6000):",
        title: "Bottom chart X axis end value",
        default: 6000.0,
    },
    CalibrationStep {
        chart: ChartKind::Power,
        axis: Axis::Y,
        endpoint: Endpoint::Start,
        stage: "calibrate_bottom_y1",
        step: "8",
        overlay: "Bottom chart (power vs flow) Y axis start: click where the lowest tick meets the axis (minimum power).",
        prompt: "Bottom chart Y axis start value (e.g. minimum power 250):",
        title: "Bottom chart Y axis start value",
        default: 250.0,
    },
    CalibrationStep {
        chart: ChartKind::Power,
        axis: Axis::Y,
        endpoint: Endpoint::End,
        stage: "calibrate_bottom_y2",
        step: "9",
        overlay: "Bottom chart (power vs flow) Y axis end: click where the highest tick meets the axis (maximum power).",
        prompt: "Bottom chart Y axis end value (e.g. maximum power 550):",
        title: "Bottom chart Y axis end value",
        default: 550.0,
    },
];

/// Run one chart's calibration steps and build its axis calibration.
///
/// `steps` must cover each axis endpoint once; a missing endpoint yields
/// [`SessionError::IncompleteCalibration`].
pub fn run_calibration<H: HostWindow>(
    ctx: &mut SessionContext,
    interaction: &mut Interaction<H>,
    input: &mut dyn NumericInput,
    steps: &[CalibrationStep],
) -> SessionResult<AxisCalibration> {
    let mut pixels = [None::<f64>; 4];
    let mut values = [None::<f64>; 4];

    let mut cursor = 0;
    while cursor < steps.len() {
        let step = &steps[cursor];
        let hint = step.hint();
        let prompt = StepPrompt {
            stage: step.stage,
            step: step.step,
            hint: &hint,
        };

        let point = match interaction.acquire_one(ctx, &prompt)? {
            Acquired::Value(point) => point,
            Acquired::StepBack => {
                if cursor > 0 {
                    cursor -= 1;
                    info!(stage = step.stage, "stepped back to the previous calibration step, click again");
                } else {
                    info!(stage = step.stage, "already at the first calibration step, cannot go back");
                }
                continue;
            }
        };

        let pixel = point.component(step.axis);
        let value = obtain_value(ctx, input, &step.request())?;
        pixels[step.slot()] = Some(pixel);
        values[step.slot()] = Some(value);
        info!(stage = step.stage, pixel, value, "{} done; pixel={pixel}, value={value}", step.stage);
        cursor += 1;
    }

    let pair = |start: usize, what: &'static str| -> SessionResult<AxisPair> {
        match (pixels[start], pixels[start + 1], values[start], values[start + 1]) {
            (Some(p1), Some(p2), Some(v1), Some(v2)) => Ok(AxisPair::new(p1, p2, v1, v2)),
            _ => Err(SessionError::IncompleteCalibration { what }),
        }
    };
    Ok(AxisCalibration::new(pair(0, "x axis")?, pair(2, "y axis")?))
}
