#![forbid(unsafe_code)]

//! `podctl-web` adapts host gesture callbacks into `podctl-core` policies.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding UI layer pushes gesture callbacks
//!   (rotation in radians, pan translation in pixels, pointer counts).
//! - **No side effects in the adapter**: haptic pulses and pan-recognizer
//!   toggles come back as values; [`host::PodControl`] applies them through
//!   the [`host::HostServices`] trait.
//! - **Deterministic**: identical callback sequences produce identical state,
//!   which [`session_record`] uses to verify recorded sessions.

pub mod gesture_adapter;
pub mod host;
#[cfg(feature = "input-parser")]
pub mod input_parser;
pub mod session_record;

pub use gesture_adapter::{
    GestureAdapter, GestureDispatch, GestureIgnoredReason, GestureInput, GestureLogEntry,
    GestureLogOutcome, GesturePhase, PanCommand,
};
pub use host::{HostServices, PodControl, RecordingHost};
