#![forbid(unsafe_code)]

//! JSON input parser for host-encoded gesture events.
//!
//! Hosts serialize each gesture callback as one JSON object:
//!
//! ```text
//! {"kind":"rotation","phase":"start","rotation":0.0}
//! {"kind":"rotation","phase":"update","rotation":0.35}
//! {"kind":"pan","phase":"start","pointers":1}
//! {"kind":"pan","phase":"update","translation_y":-24.5,"pointers":1}
//! {"kind":"finalize"}
//! ```
//!
//! The gesture-handler spellings `translationY` and `numberOfPointers` are
//! accepted as aliases. A missing or `null` rotation/translation is treated
//! as zero; the pointer count is required for pan events.

use serde::Deserialize;

use crate::gesture_adapter::GestureInput;

/// Errors from parsing encoded gesture JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown gesture kind.
    UnknownKind(String),
    /// Unknown phase for a known kind.
    UnknownPhase(String),
}

impl core::fmt::Display for GestureParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownKind(kind) => write!(f, "unknown gesture kind: {kind}"),
            Self::UnknownPhase(phase) => write!(f, "unknown phase: {phase}"),
        }
    }
}

impl std::error::Error for GestureParseError {}

/// A parse error on a specific line of a gesture script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptParseError {
    /// 1-based line number.
    pub line: usize,
    pub error: GestureParseError,
}

impl core::fmt::Display for ScriptParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

impl std::error::Error for ScriptParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Internal deserialization target for one host event.
#[derive(Debug, Deserialize)]
struct RawGesture {
    kind: String,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    rotation: Option<f64>,
    #[serde(default, alias = "translationY")]
    translation_y: Option<f64>,
    #[serde(default, alias = "numberOfPointers")]
    pointers: Option<u32>,
}

/// Parse one JSON-encoded gesture event into a [`GestureInput`].
pub fn parse_gesture_event(json: &str) -> Result<GestureInput, GestureParseError> {
    let raw: RawGesture =
        serde_json::from_str(json).map_err(|e| GestureParseError::Json(e.to_string()))?;

    match raw.kind.as_str() {
        "rotation" => parse_rotation(&raw),
        "pan" => parse_pan(&raw),
        "finalize" => Ok(GestureInput::Finalize),
        other => Err(GestureParseError::UnknownKind(other.to_string())),
    }
}

fn phase(raw: &RawGesture) -> Result<&str, GestureParseError> {
    raw.phase
        .as_deref()
        .ok_or(GestureParseError::MissingField("phase"))
}

fn parse_rotation(raw: &RawGesture) -> Result<GestureInput, GestureParseError> {
    let rotation = raw.rotation.unwrap_or(0.0);
    match phase(raw)? {
        "start" => Ok(GestureInput::RotationStart { rotation }),
        "update" => Ok(GestureInput::RotationUpdate { rotation }),
        other => Err(GestureParseError::UnknownPhase(other.to_string())),
    }
}

fn parse_pan(raw: &RawGesture) -> Result<GestureInput, GestureParseError> {
    let phase = phase(raw)?;
    let pointers = raw
        .pointers
        .ok_or(GestureParseError::MissingField("pointers"))?;
    match phase {
        "start" => Ok(GestureInput::PanStart { pointers }),
        "update" => Ok(GestureInput::PanUpdate {
            translation_y: raw.translation_y.unwrap_or(0.0),
            pointers,
        }),
        other => Err(GestureParseError::UnknownPhase(other.to_string())),
    }
}

/// Parse a newline-delimited gesture script.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_gesture_script(text: &str) -> Result<Vec<GestureInput>, ScriptParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            parse_gesture_event(line).map_err(|error| ScriptParseError {
                line: idx + 1,
                error,
            })
        })
        .collect()
}
