//! Scripted sessions: a YAML file stands in for the window, the user and the save dialog.
//!
//! ```yaml
//! config:
//!   igvs: "0, 20"
//!   num_points: 7
//! values: [3000, 6000, 2, 11, 3000, 6000, 250, 550]
//! events:
//!   - { kind: click, x: 300, y: 700 }
//!   - { kind: key, key: enter }
//!   - { kind: close }
//! ```
//!
//! The scripted host delivers one event per pump. Once the script runs out the window reads
//! as closed, so an incomplete script cancels the session instead of hanging.

use crate::chart::CurveTrace;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::events::{HostKey, HostWindow, Liveness, PointerButton, RawInput};
use crate::input::TextChannelInput;
use crate::session::{ExportTarget, Session};
use cd_core::PixelPoint;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::VecDeque;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Welcome-form fields, as free-form YAML scalars or lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub igvs: Option<Value>,
    pub num_points: Option<Value>,
    pub design_flow: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptButton {
    #[default]
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    Click {
        x: f64,
        y: f64,
        #[serde(default)]
        outside: bool,
        #[serde(default)]
        button: ScriptButton,
    },
    Key {
        key: String,
    },
    Close,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    pub config: ScriptConfig,
    /// Answers to the numeric prompts, in order.
    pub values: Vec<Value>,
    pub events: Vec<ScriptEvent>,
}

pub type ReplaySession = Session<ScriptedHost, TextChannelInput<Cursor<Vec<u8>>, io::Sink>, FixedExportPath>;

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Sequence(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        _ => String::new(),
    }
}

impl ReplayScript {
    pub fn from_yaml_str(text: &str) -> SessionResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> SessionResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Resolve the configuration the way the welcome form would.
    pub fn session_config(&self) -> (SessionConfig, Vec<String>) {
        let (igvs, num_points, design_flow) = SessionConfig::default().form_texts();
        let field = |value: &Option<Value>, fallback: String| value.as_ref().map(scalar_text).unwrap_or(fallback);
        SessionConfig::from_form(
            &field(&self.config.igvs, igvs),
            &field(&self.config.num_points, num_points),
            &field(&self.config.design_flow, design_flow),
        )
    }

    /// Numeric answers as a line-oriented text channel.
    pub fn numeric_input(&self) -> TextChannelInput<Cursor<Vec<u8>>, io::Sink> {
        let mut text = String::new();
        for value in &self.values {
            text.push_str(&scalar_text(value));
            text.push('\n');
        }
        TextChannelInput::new(Cursor::new(text.into_bytes()), io::sink())
    }

    /// Build a ready-to-run session plus the configuration advisories.
    pub fn into_session(self, output: Option<PathBuf>) -> (ReplaySession, Vec<String>) {
        let (config, advisories) = self.session_config();
        let input = self.numeric_input();
        let host = ScriptedHost::new(self.events);
        (Session::new(host, input, FixedExportPath(output), config), advisories)
    }
}

/// [`HostWindow`] fed from a list of scripted events.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    events: VecDeque<ScriptEvent>,
    closed: bool,
    overlays: Vec<String>,
    titles: Vec<String>,
    traces: Vec<CurveTrace>,
}

impl ScriptedHost {
    pub fn new(events: impl IntoIterator<Item = ScriptEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn overlays(&self) -> &[String] {
        &self.overlays
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn traces(&self) -> &[CurveTrace] {
        &self.traces
    }
}

impl HostWindow for ScriptedHost {
    fn liveness(&self) -> Liveness {
        if self.closed {
            Liveness::Closed
        } else {
            Liveness::Open
        }
    }

    fn pump(&mut self, _pause: Duration, sink: &mut Vec<RawInput>) {
        match self.events.pop_front() {
            Some(ScriptEvent::Click {
                x,
                y,
                outside,
                button,
            }) => sink.push(RawInput::Click {
                point: PixelPoint::new(x, y),
                button: match button {
                    ScriptButton::Left => PointerButton::Primary,
                    ScriptButton::Right => PointerButton::Secondary,
                    ScriptButton::Middle => PointerButton::Middle,
                },
                in_region: !outside,
            }),
            Some(ScriptEvent::Key { key }) => sink.push(RawInput::Key(HostKey::from_name(&key))),
            Some(ScriptEvent::Close) | None => self.closed = true,
        }
    }

    fn show_overlay(&mut self, text: &str) {
        self.overlays.push(text.to_string());
    }

    fn set_title(&mut self, text: &str) {
        self.titles.push(text.to_string());
    }

    fn draw_trace(&mut self, trace: &CurveTrace) {
        self.traces.push(trace.clone());
    }
}

/// Save "dialog" with a predetermined answer.
#[derive(Debug, Clone, Default)]
pub struct FixedExportPath(pub Option<PathBuf>);

impl ExportTarget for FixedExportPath {
    fn choose_path(&mut self, _default_name: &str) -> Option<PathBuf> {
        self.0.clone()
    }
}
