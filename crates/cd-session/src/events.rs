//! Event queue adapter between the host window and the session.
//!
//! The host delivers raw input (clicks with their button and whether they landed in the
//! plotting region, key presses). The adapter filters and translates it into
//! [`InteractionEvent`]s and keeps them in a bounded FIFO buffer. Liveness of the window is
//! checked on every poll; a closed window cancels the session.

use crate::chart::CurveTrace;
use crate::context::SessionContext;
use crate::error::{CancelReason, SessionResult};
use cd_core::PixelPoint;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::warn;

/// Default buffer capacity of [`EventQueue`].
pub const DEFAULT_CAPACITY: usize = 256;

/// How long each poll hands control to the host when the buffer is empty.
pub const POLL_PAUSE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Keys as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKey {
    Escape,
    Backspace,
    Enter,
    Char(char),
    Other,
}

impl HostKey {
    /// Parse a key name such as `escape`, `enter`, `backspace` or a single character.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "escape" | "esc" => HostKey::Escape,
            "backspace" => HostKey::Backspace,
            "enter" | "return" => HostKey::Enter,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => HostKey::Char(c),
                    _ => HostKey::Other,
                }
            }
        }
    }
}

/// Unfiltered input from the host window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    Click {
        point: PixelPoint,
        button: PointerButton,
        /// Whether the click landed inside the plotting region.
        in_region: bool,
    },
    Key(HostKey),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    Click(PixelPoint),
    Back,
    Finish,
    Cancel,
}

/// Translate raw host input; `None` for input the session ignores.
pub fn translate(raw: &RawInput) -> Option<InteractionEvent> {
    match *raw {
        RawInput::Click {
            point,
            button,
            in_region,
        } => {
            if !in_region || button != PointerButton::Primary {
                return None;
            }
            Some(InteractionEvent::Click(point))
        }
        RawInput::Key(key) => match key {
            HostKey::Escape => Some(InteractionEvent::Cancel),
            HostKey::Char(c) if c.eq_ignore_ascii_case(&'q') => Some(InteractionEvent::Cancel),
            HostKey::Backspace => Some(InteractionEvent::Back),
            HostKey::Char(c) if c.eq_ignore_ascii_case(&'b') => Some(InteractionEvent::Back),
            HostKey::Enter => Some(InteractionEvent::Finish),
            _ => None,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Open,
    /// The user closed the window.
    Closed,
    /// The window is gone without a close notification.
    Destroyed,
}

/// Windowing capability the session runs against.
pub trait HostWindow {
    fn liveness(&self) -> Liveness;

    /// Hand control to the host for up to `pause`, appending raw input delivered meanwhile.
    fn pump(&mut self, pause: Duration, sink: &mut Vec<RawInput>);

    fn show_overlay(&mut self, text: &str);

    fn set_title(&mut self, text: &str);

    fn draw_trace(&mut self, trace: &CurveTrace);
}

/// Bounded FIFO of interaction events fed by a [`HostWindow`].
pub struct EventQueue<H> {
    host: H,
    buffer: VecDeque<InteractionEvent>,
    capacity: usize,
    pause: Duration,
    scratch: Vec<RawInput>,
}

impl<H: HostWindow> EventQueue<H> {
    pub fn new(host: H) -> Self {
        Self::with_capacity(host, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(host: H, capacity: usize) -> Self {
        Self {
            host,
            buffer: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            pause: POLL_PAUSE,
            scratch: Vec::new(),
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Filter, translate and enqueue one raw input. Returns whether it was queued.
    pub fn push_raw(&mut self, raw: &RawInput) -> bool {
        let Some(event) = translate(raw) else {
            return false;
        };
        if self.buffer.len() >= self.capacity {
            warn!(capacity = self.capacity, ?event, "event buffer full, dropping event");
            return false;
        }
        self.buffer.push_back(event);
        true
    }

    /// Fail with a cancellation if the window is no longer usable.
    pub fn ensure_alive(&self, ctx: &mut SessionContext) -> SessionResult<()> {
        match self.host.liveness() {
            Liveness::Open => Ok(()),
            Liveness::Closed => Err(ctx.cancel(CancelReason::WindowClosed)),
            Liveness::Destroyed => Err(ctx.cancel(CancelReason::WindowDestroyed)),
        }
    }

    /// Oldest buffered event, yielding to the host once if the buffer is empty.
    pub fn poll(&mut self, ctx: &mut SessionContext) -> SessionResult<Option<InteractionEvent>> {
        self.ensure_alive(ctx)?;
        if let Some(event) = self.buffer.pop_front() {
            return Ok(Some(event));
        }

        let mut raw = std::mem::take(&mut self.scratch);
        self.host.pump(self.pause, &mut raw);
        for input in raw.drain(..) {
            self.push_raw(&input);
        }
        self.scratch = raw;

        self.ensure_alive(ctx)?;
        Ok(self.buffer.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubHost {
        liveness: Liveness,
        batches: VecDeque<Vec<RawInput>>,
        pumps: usize,
    }

    impl StubHost {
        fn new(batches: Vec<Vec<RawInput>>) -> Self {
            Self {
                liveness: Liveness::Open,
                batches: batches.into(),
                pumps: 0,
            }
        }
    }

    impl HostWindow for StubHost {
        fn liveness(&self) -> Liveness {
            self.liveness
        }

        fn pump(&mut self, _pause: Duration, sink: &mut Vec<RawInput>) {
            self.pumps += 1;
            if let Some(batch) = self.batches.pop_front() {
                sink.extend(batch);
            }
        }

        fn show_overlay(&mut self, _text: &str) {}

        fn set_title(&mut self, _text: &str) {}

        fn draw_trace(&mut self, _trace: &CurveTrace) {}
    }

    fn click(x: f64, y: f64) -> RawInput {
        RawInput::Click {
            point: PixelPoint::new(x, y),
            button: PointerButton::Primary,
            in_region: true,
        }
    }

    #[test]
    fn key_mapping() {
        let cases = [
            (HostKey::Escape, Some(InteractionEvent::Cancel)),
            (HostKey::Char('q'), Some(InteractionEvent::Cancel)),
            (HostKey::Backspace, Some(InteractionEvent::Back)),
            (HostKey::Char('b'), Some(InteractionEvent::Back)),
            (HostKey::Enter, Some(InteractionEvent::Finish)),
            (HostKey::Char('x'), None),
            (HostKey::Other, None),
        ];
        for (key, expected) in cases {
            assert_eq!(translate(&RawInput::Key(key)), expected, "{key:?}");
        }
    }

    #[test]
    fn key_names() {
        assert_eq!(HostKey::from_name("Escape"), HostKey::Escape);
        assert_eq!(HostKey::from_name("return"), HostKey::Enter);
        assert_eq!(HostKey::from_name("backspace"), HostKey::Backspace);
        assert_eq!(HostKey::from_name("b"), HostKey::Char('b'));
        assert_eq!(HostKey::from_name("shift"), HostKey::Other);
    }

    #[test]
    fn discards_outside_and_secondary_clicks() {
        let outside = RawInput::Click {
            point: PixelPoint::new(1.0, 1.0),
            button: PointerButton::Primary,
            in_region: false,
        };
        let secondary = RawInput::Click {
            point: PixelPoint::new(1.0, 1.0),
            button: PointerButton::Secondary,
            in_region: true,
        };
        assert_eq!(translate(&outside), None);
        assert_eq!(translate(&secondary), None);
        assert_eq!(
            translate(&click(3.0, 4.0)),
            Some(InteractionEvent::Click(PixelPoint::new(3.0, 4.0)))
        );
    }

    #[test]
    fn poll_preserves_arrival_order() {
        let host = StubHost::new(vec![vec![
            click(1.0, 1.0),
            RawInput::Key(HostKey::Char('b')),
            RawInput::Key(HostKey::Enter),
        ]]);
        let mut queue = EventQueue::new(host);
        let mut ctx = SessionContext::new();

        assert_eq!(
            queue.poll(&mut ctx).unwrap(),
            Some(InteractionEvent::Click(PixelPoint::new(1.0, 1.0)))
        );
        assert_eq!(queue.poll(&mut ctx).unwrap(), Some(InteractionEvent::Back));
        assert_eq!(queue.poll(&mut ctx).unwrap(), Some(InteractionEvent::Finish));
        assert_eq!(queue.poll(&mut ctx).unwrap(), None);
        assert_eq!(queue.host().pumps, 2);
    }

    #[test]
    fn closed_window_cancels_even_with_buffered_events() {
        let mut queue = EventQueue::new(StubHost::new(vec![]));
        let mut ctx = SessionContext::new();
        assert!(queue.push_raw(&click(1.0, 1.0)));
        queue.host_mut().liveness = Liveness::Closed;

        let err = queue.poll(&mut ctx).unwrap_err();
        assert_eq!(err.cancel_reason(), Some(&CancelReason::WindowClosed));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn destroyed_window_has_own_reason() {
        let mut queue = EventQueue::new(StubHost::new(vec![]));
        queue.host_mut().liveness = Liveness::Destroyed;
        let mut ctx = SessionContext::new();
        let err = queue.poll(&mut ctx).unwrap_err();
        assert_eq!(err.cancel_reason(), Some(&CancelReason::WindowDestroyed));
    }

    #[test]
    fn buffer_is_bounded() {
        let mut queue = EventQueue::with_capacity(StubHost::new(vec![]), 2);
        assert!(queue.push_raw(&click(1.0, 1.0)));
        assert!(queue.push_raw(&click(2.0, 2.0)));
        assert!(!queue.push_raw(&click(3.0, 3.0)));
        assert_eq!(queue.len(), 2);
    }
}
