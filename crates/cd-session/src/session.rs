//! Session orchestrator: calibration, per-IGV curve picking, alignment and export.
//!
//! Steps are numbered for the user: 1 is image selection (done by the frontend before the
//! session starts), 2-9 are the two calibrations, `10 + 2i` / `11 + 2i` pick the pressure and
//! power curves of IGV index `i`, then `10 + 2n` exports and `11 + 2n` is done.

use crate::calibration::{BOTTOM_STEPS, TOP_STEPS, run_calibration};
use crate::chart::{ChartKind, CurveTrace, TraceColor};
use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::error::{SessionError, SessionResult};
use crate::events::{EventQueue, HostWindow};
use crate::export::write_rows;
use crate::input::NumericInput;
use crate::interaction::{Acquired, Interaction, PickedPointSet, StepPrompt};
use cd_curves::{AlignOptions, AlignedRow, ChartCalibrations, align_igv};
use std::path::PathBuf;
use tracing::{error, info, warn};

pub const DEFAULT_EXPORT_NAME: &str = "Compressor_Curve_Data.csv";

/// Where the CSV goes. `None` means the user cancelled the save.
pub trait ExportTarget {
    fn choose_path(&mut self, default_name: &str) -> Option<PathBuf>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Exported { path: PathBuf, rows: usize },
    NotExported { rows: usize },
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub rows: Vec<AlignedRow>,
    /// IGV settings that produced no rows.
    pub skipped: Vec<f64>,
    pub outcome: SessionOutcome,
}

pub struct Session<H, N, E> {
    ctx: SessionContext,
    interaction: Interaction<H>,
    input: N,
    export: E,
    config: SessionConfig,
}

impl<H: HostWindow, N: NumericInput, E: ExportTarget> Session<H, N, E> {
    pub fn new(host: H, input: N, export: E, config: SessionConfig) -> Self {
        Self::with_queue(EventQueue::new(host), input, export, config)
    }

    pub fn with_queue(queue: EventQueue<H>, input: N, export: E, config: SessionConfig) -> Self {
        Self {
            ctx: SessionContext::new(),
            interaction: Interaction::new(queue),
            input,
            export,
            config,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        self.interaction.host()
    }

    pub fn into_host(self) -> H {
        self.interaction.into_host()
    }

    /// Run the whole workflow. Cancellation returns `Err` before anything is exported.
    pub fn run(&mut self) -> SessionResult<SessionReport> {
        info!(
            stage = %self.ctx.stage(),
            igvs = ?self.config.igvs,
            num_points = self.config.num_points,
            design_flow = self.config.design_flow,
            "session configuration"
        );

        info!(stage = %self.ctx.stage(), "calibrating axes (top: pressure vs flow, bottom: power vs flow)");
        let pressure = run_calibration(&mut self.ctx, &mut self.interaction, &mut self.input, &TOP_STEPS)?;
        let power = run_calibration(&mut self.ctx, &mut self.interaction, &mut self.input, &BOTTOM_STEPS)?;
        let calibrations = ChartCalibrations { pressure, power };
        let options = self.config.align_options();

        let igvs = self.config.igvs.clone();
        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        for (index, &igv) in igvs.iter().enumerate() {
            match self.digitize_igv(index, igv, &calibrations, &options)? {
                Some(igv_rows) => rows.extend(igv_rows),
                None => skipped.push(igv),
            }
        }

        let outcome = self.export(igvs.len(), &rows)?;
        Ok(SessionReport {
            rows,
            skipped,
            outcome,
        })
    }

    fn digitize_igv(
        &mut self,
        index: usize,
        igv: f64,
        calibrations: &ChartCalibrations,
        options: &AlignOptions,
    ) -> SessionResult<Option<Vec<AlignedRow>>> {
        info!(stage = %self.ctx.stage(), igv, "===== IGV = {igv} =====");
        let color = TraceColor::for_index(index);
        let step_base = 10 + 2 * index;

        let Some(top) = self.pick_curve(ChartKind::Pressure, igv, step_base)? else {
            return Ok(None);
        };
        self.draw(ChartKind::Pressure, igv, color, &top);

        let Some(bottom) = self.pick_curve(ChartKind::Power, igv, step_base + 1)? else {
            return Ok(None);
        };
        self.draw(ChartKind::Power, igv, color, &bottom);

        match align_igv(igv, top.as_slice(), bottom.as_slice(), calibrations, options) {
            Ok(rows) => {
                info!(stage = %self.ctx.stage(), igv, rows = rows.len(), "IGV={igv}: aligned {} rows", rows.len());
                Ok(Some(rows))
            }
            Err(e) => {
                warn!(stage = %self.ctx.stage(), igv, error = %e, "IGV={igv} skipped: {e}");
                Ok(None)
            }
        }
    }

    /// Pick one curve, restarting on "back" with no points. `None` when finished empty.
    fn pick_curve(
        &mut self,
        chart: ChartKind,
        igv: f64,
        step: usize,
    ) -> SessionResult<Option<PickedPointSet>> {
        let position = chart.position();
        let stage = format!("igv_{igv}_{position}_points");
        let step = step.to_string();
        let hint = format!(
            "IGV={igv} {}, pick points:\n- left-click several points along the curve\n- Enter finishes this curve\n- B undoes the last point; Q/Esc aborts\n- make sure the image holds two stacked charts",
            chart.label()
        );
        let prompt = StepPrompt {
            stage: &stage,
            step: &step,
            hint: &hint,
        };

        loop {
            match self.interaction.acquire_many(&mut self.ctx, &prompt)? {
                Acquired::StepBack => {
                    info!(stage = %self.ctx.stage(), igv, "IGV={igv} {position} points: stepped back, picking again");
                }
                Acquired::Value(points) if points.is_empty() => {
                    info!(stage = %self.ctx.stage(), igv, "IGV={igv} {position} chart has no points, skipping");
                    return Ok(None);
                }
                Acquired::Value(points) => return Ok(Some(points)),
            }
        }
    }

    fn draw(&mut self, chart: ChartKind, igv: f64, color: TraceColor, points: &PickedPointSet) {
        self.interaction.draw_trace(&CurveTrace {
            chart,
            igv,
            color,
            points: points.as_slice().to_vec(),
        });
    }

    fn export(&mut self, igv_count: usize, rows: &[AlignedRow]) -> SessionResult<SessionOutcome> {
        let export_step = (10 + 2 * igv_count).to_string();
        let done_step = (11 + 2 * igv_count).to_string();

        self.ctx.set_stage("export_csv");
        self.interaction
            .announce(&mut self.ctx, &export_step, "Save CSV: choose the export path");

        let Some(path) = self.export.choose_path(DEFAULT_EXPORT_NAME) else {
            info!(stage = %self.ctx.stage(), "save cancelled by the user, no CSV exported");
            self.interaction.set_title(
                &mut self.ctx,
                "Save cancelled, nothing exported. Press Q or close the window to exit.",
            );
            self.ctx.set_stage("done");
            self.interaction.announce(
                &mut self.ctx,
                &done_step,
                "Save cancelled, nothing exported. Press Q/Esc to quit.",
            );
            return Ok(SessionOutcome::NotExported { rows: rows.len() });
        };

        write_rows(&path, rows)?;
        info!(
            stage = %self.ctx.stage(),
            path = %path.display(),
            rows = rows.len(),
            "CSV exported to {}; {} rows",
            path.display(),
            rows.len()
        );

        self.interaction
            .set_title(&mut self.ctx, &format!("Done: exported {}", path.display()));
        self.ctx.set_stage("done");
        self.interaction.announce(
            &mut self.ctx,
            &done_step,
            &format!(
                "Done. Exported to: {}\nClose the window or press Q/Esc to exit.",
                path.display()
            ),
        );
        Ok(SessionOutcome::Exported {
            path,
            rows: rows.len(),
        })
    }
}

/// Final log line for a finished session, tagged with the stage it ended in.
pub fn log_session_end(stage: &str, result: &SessionResult<SessionReport>) {
    match result {
        Ok(report) => match &report.outcome {
            SessionOutcome::Exported { .. } => info!(stage, "exit: finished normally"),
            SessionOutcome::NotExported { .. } => info!(stage, "exit: user cancelled the save"),
        },
        Err(SessionError::Cancelled(reason)) => {
            info!(stage, reason = %reason, "exit: user aborted; reason={reason}")
        }
        Err(e) => error!(stage, error = ?e, "exit: unhandled error: {e}"),
    }
}
