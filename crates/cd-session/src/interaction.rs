//! Blocking point acquisition on top of the event queue.
//!
//! Both operations loop on [`EventQueue::poll`] until an event resolves them. Every poll yields
//! to the host, so the window stays responsive, and checks liveness, so closing the window
//! cancels whatever acquisition is in progress.

use crate::chart::CurveTrace;
use crate::context::SessionContext;
use crate::error::{CancelReason, SessionResult};
use crate::events::{EventQueue, HostWindow, InteractionEvent};
use cd_core::PixelPoint;
use tracing::info;

/// Result of an acquisition: a value, or a request to go back one step.
#[derive(Debug, Clone, PartialEq)]
pub enum Acquired<T> {
    Value(T),
    StepBack,
}

/// Points picked along one curve, frozen once acquisition returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickedPointSet {
    points: Vec<PixelPoint>,
}

impl PickedPointSet {
    fn push(&mut self, point: PixelPoint) {
        self.points.push(point);
    }

    fn pop(&mut self) -> Option<PixelPoint> {
        self.points.pop()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[PixelPoint] {
        &self.points
    }

    pub fn into_vec(self) -> Vec<PixelPoint> {
        self.points
    }
}

/// Names and hint text for one acquisition step.
#[derive(Debug, Clone, Copy)]
pub struct StepPrompt<'a> {
    /// Stage tag used in log lines, e.g. `calibrate_top_x1`.
    pub stage: &'a str,
    /// Numbered step label shown to the user.
    pub step: &'a str,
    pub hint: &'a str,
}

pub struct Interaction<H> {
    queue: EventQueue<H>,
}

impl<H: HostWindow> Interaction<H> {
    pub fn new(queue: EventQueue<H>) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &EventQueue<H> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut EventQueue<H> {
        &mut self.queue
    }

    pub fn host(&self) -> &H {
        self.queue.host()
    }

    pub fn into_host(self) -> H {
        self.queue.into_host()
    }

    pub fn set_overlay(&mut self, ctx: &mut SessionContext, text: &str) {
        if ctx.replace_overlay(text) {
            self.queue.host_mut().show_overlay(text);
        }
    }

    pub fn set_title(&mut self, ctx: &mut SessionContext, text: &str) {
        if ctx.replace_title(text) {
            self.queue.host_mut().set_title(text);
        }
    }

    /// Log a step message and show it in the overlay.
    pub fn announce(&mut self, ctx: &mut SessionContext, step: &str, message: &str) {
        info!(stage = %ctx.stage(), step, "step {step}: {message}");
        self.set_overlay(ctx, &format!("Step {step}:\n{message}"));
    }

    pub fn draw_trace(&mut self, trace: &CurveTrace) {
        self.queue.host_mut().draw_trace(trace);
    }

    fn begin_step(&mut self, ctx: &mut SessionContext, prompt: &StepPrompt<'_>) {
        ctx.clear_cancel_reason();
        ctx.set_stage(prompt.stage);
        self.set_title(ctx, prompt.hint);
        self.announce(ctx, prompt.step, prompt.hint);
    }

    /// Wait for a single click. `finish` is ignored in this mode.
    pub fn acquire_one(
        &mut self,
        ctx: &mut SessionContext,
        prompt: &StepPrompt<'_>,
    ) -> SessionResult<Acquired<PixelPoint>> {
        self.begin_step(ctx, prompt);
        let step = prompt.step;
        loop {
            let Some(event) = self.queue.poll(ctx)? else {
                continue;
            };
            match event {
                InteractionEvent::Click(point) => {
                    info!(stage = %ctx.stage(), step, points = 1, "step {step}: got point {point}");
                    return Ok(Acquired::Value(point));
                }
                InteractionEvent::Back => {
                    info!(stage = %ctx.stage(), step, points = 0, "step {step}: back requested");
                    return Ok(Acquired::StepBack);
                }
                InteractionEvent::Finish => continue,
                InteractionEvent::Cancel => {
                    info!(stage = %ctx.stage(), step, "user aborted from the keyboard");
                    return Err(ctx.cancel(CancelReason::KeyboardQuit));
                }
            }
        }
    }

    /// Collect clicks until `finish`.
    ///
    /// `back` removes the last point; with no points left it returns [`Acquired::StepBack`] so
    /// the caller can restart the whole step.
    pub fn acquire_many(
        &mut self,
        ctx: &mut SessionContext,
        prompt: &StepPrompt<'_>,
    ) -> SessionResult<Acquired<PickedPointSet>> {
        self.begin_step(ctx, prompt);
        let step = prompt.step;
        let mut picked = PickedPointSet::default();
        loop {
            let status = format!(
                "Step {step}:\n{}\nPoints picked: {}. Left-click adds a point, B undoes the last one, Enter finishes, Q/Esc aborts.",
                prompt.hint,
                picked.len()
            );
            self.set_overlay(ctx, &status);

            let Some(event) = self.queue.poll(ctx)? else {
                continue;
            };
            match event {
                InteractionEvent::Click(point) => {
                    picked.push(point);
                    info!(stage = %ctx.stage(), step, points = picked.len(), "step {step}: added point {point}");
                }
                InteractionEvent::Back => match picked.pop() {
                    Some(removed) => {
                        info!(stage = %ctx.stage(), step, points = picked.len(), "step {step}: removed point {removed}");
                    }
                    None => {
                        info!(stage = %ctx.stage(), step, points = 0, "step {step}: nothing to undo, restarting step");
                        return Ok(Acquired::StepBack);
                    }
                },
                InteractionEvent::Finish => {
                    info!(stage = %ctx.stage(), step, points = picked.len(), "step {step}: finished with {} point(s)", picked.len());
                    return Ok(Acquired::Value(picked));
                }
                InteractionEvent::Cancel => {
                    info!(stage = %ctx.stage(), step, "user aborted from the keyboard");
                    return Err(ctx.cancel(CancelReason::KeyboardQuit));
                }
            }
        }
    }
}
