//! Numeric value input.
//!
//! Calibration needs the engineering value of each clicked tick. Values come from a text
//! channel (a terminal, or any `BufRead`) when one is available, otherwise from a modal
//! dialog supplied by the host. Both sit behind [`NumericInput`]; [`obtain_value`] owns the
//! retry-on-garbage and cancellation rules.

use crate::context::SessionContext;
use crate::error::{CancelReason, SessionResult};
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::{info, warn};

/// Prompt shown after a value failed to parse.
pub const INVALID_VALUE_PROMPT: &str = "Invalid value, please re-enter:";

/// What to ask for.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRequest {
    pub title: String,
    pub prompt: String,
    pub default: f64,
}

impl ValueRequest {
    pub fn new(title: impl Into<String>, prompt: impl Into<String>, default: f64) -> Self {
        Self {
            title: title.into(),
            prompt: prompt.into(),
            default,
        }
    }
}

/// Raw reply from an input channel, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawReply {
    Text(String),
    /// The channel has nothing to offer (closed, empty answer, not attached).
    Unavailable,
    /// The user dismissed the prompt.
    Dismissed,
}

pub trait NumericInput {
    fn read_raw(&mut self, prompt: &str, request: &ValueRequest) -> SessionResult<RawReply>;
}

impl<T: NumericInput + ?Sized> NumericInput for Box<T> {
    fn read_raw(&mut self, prompt: &str, request: &ValueRequest) -> SessionResult<RawReply> {
        (**self).read_raw(prompt, request)
    }
}

/// Obtain a finite float, re-asking on unparsable text.
pub fn obtain_value(
    ctx: &mut SessionContext,
    input: &mut dyn NumericInput,
    request: &ValueRequest,
) -> SessionResult<f64> {
    let mut prompt = request.prompt.clone();
    loop {
        match input.read_raw(&prompt, request)? {
            RawReply::Text(raw) => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => return Ok(value),
                _ => {
                    warn!(stage = %ctx.stage(), raw = %raw, "invalid numeric value, asking again");
                    prompt = INVALID_VALUE_PROMPT.to_string();
                }
            },
            RawReply::Dismissed => {
                info!(stage = %ctx.stage(), "numeric input dismissed");
                return Err(ctx.cancel(CancelReason::InputDismissed));
            }
            RawReply::Unavailable => return Err(ctx.cancel(CancelReason::NoInputChannel)),
        }
    }
}

/// Line-oriented text channel: one value per line.
pub struct TextChannelInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TextChannelInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl TextChannelInput<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> NumericInput for TextChannelInput<R, W> {
    fn read_raw(&mut self, prompt: &str, _request: &ValueRequest) -> SessionResult<RawReply> {
        write!(self.writer, "{prompt} ")?;
        self.writer.flush()?;

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(RawReply::Unavailable),
            Ok(_) if line.trim().is_empty() => Ok(RawReply::Unavailable),
            Ok(_) => Ok(RawReply::Text(line.trim_end_matches(['\r', '\n']).to_string())),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(RawReply::Dismissed),
            Err(e) => Err(e.into()),
        }
    }
}

/// Host-provided modal prompt. `None` means the user dismissed it.
pub trait NumericDialog {
    fn ask(&mut self, title: &str, prompt: &str, initial: &str) -> Option<String>;
}

/// [`NumericInput`] backed by a modal dialog, pre-filled with the request default.
pub struct DialogInput<D> {
    dialog: D,
}

impl<D: NumericDialog> DialogInput<D> {
    pub fn new(dialog: D) -> Self {
        Self { dialog }
    }
}

impl<D: NumericDialog> NumericInput for DialogInput<D> {
    fn read_raw(&mut self, prompt: &str, request: &ValueRequest) -> SessionResult<RawReply> {
        let initial = request.default.to_string();
        Ok(match self.dialog.ask(&request.title, prompt, &initial) {
            Some(text) => RawReply::Text(text),
            None => RawReply::Dismissed,
        })
    }
}

/// Try `primary` first; fall back to `secondary` when it has nothing to offer.
pub struct FallbackInput<A, B> {
    primary: A,
    secondary: B,
}

impl<A: NumericInput, B: NumericInput> FallbackInput<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<A: NumericInput, B: NumericInput> NumericInput for FallbackInput<A, B> {
    fn read_raw(&mut self, prompt: &str, request: &ValueRequest) -> SessionResult<RawReply> {
        match self.primary.read_raw(prompt, request)? {
            RawReply::Unavailable => self.secondary.read_raw(prompt, request),
            reply => Ok(reply),
        }
    }
}

/// Terminal first with the dialog as fallback when stdin is a terminal, otherwise the dialog.
pub fn select_numeric_input<D>(dialog: D) -> Box<dyn NumericInput>
where
    D: NumericDialog + 'static,
{
    if io::stdin().is_terminal() {
        Box::new(FallbackInput::new(
            TextChannelInput::stdin(),
            DialogInput::new(dialog),
        ))
    } else {
        Box::new(DialogInput::new(dialog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn request() -> ValueRequest {
        ValueRequest::new("Top X start", "Top chart X start value:", 3000.0)
    }

    fn text(lines: &str) -> TextChannelInput<Cursor<Vec<u8>>, io::Sink> {
        TextChannelInput::new(Cursor::new(lines.as_bytes().to_vec()), io::sink())
    }

    struct ScriptedDialog {
        replies: Vec<Option<String>>,
        asked: Vec<(String, String)>,
    }

    impl NumericDialog for ScriptedDialog {
        fn ask(&mut self, _title: &str, prompt: &str, initial: &str) -> Option<String> {
            self.asked.push((prompt.to_string(), initial.to_string()));
            if self.replies.is_empty() {
                None
            } else {
                self.replies.remove(0)
            }
        }
    }

    #[test]
    fn reads_value_from_text_channel() {
        let mut ctx = SessionContext::new();
        let mut input = text("3500\n");
        assert_eq!(obtain_value(&mut ctx, &mut input, &request()).unwrap(), 3500.0);
    }

    #[test]
    fn retries_after_garbage() {
        let mut ctx = SessionContext::new();
        let mut input = text("abc\nnan\n 12.5 \n");
        assert_eq!(obtain_value(&mut ctx, &mut input, &request()).unwrap(), 12.5);
    }

    #[test]
    fn exhausted_channel_cancels() {
        let mut ctx = SessionContext::new();
        let mut input = text("");
        let err = obtain_value(&mut ctx, &mut input, &request()).unwrap_err();
        assert_eq!(err.cancel_reason(), Some(&CancelReason::NoInputChannel));
    }

    #[test]
    fn dialog_dismissal_cancels() {
        let mut ctx = SessionContext::new();
        let mut input = DialogInput::new(ScriptedDialog {
            replies: vec![None],
            asked: vec![],
        });
        let err = obtain_value(&mut ctx, &mut input, &request()).unwrap_err();
        assert_eq!(err.cancel_reason(), Some(&CancelReason::InputDismissed));
    }

    #[test]
    fn empty_line_falls_back_to_dialog_with_default() {
        let mut ctx = SessionContext::new();
        let dialog = ScriptedDialog {
            replies: vec![Some("oops".to_string()), Some("6000".to_string())],
            asked: vec![],
        };
        let mut input = FallbackInput::new(text("\n"), DialogInput::new(dialog));
        assert_eq!(obtain_value(&mut ctx, &mut input, &request()).unwrap(), 6000.0);

        let asked = &input.secondary.dialog.asked;
        assert_eq!(asked.len(), 2);
        assert_eq!(asked[0].0, "Top chart X start value:");
        assert_eq!(asked[0].1, "3000");
        assert_eq!(asked[1].0, INVALID_VALUE_PROMPT);
    }
}
