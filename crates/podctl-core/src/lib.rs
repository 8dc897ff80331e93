#![forbid(unsafe_code)]

//! Core: the gesture-to-control quantization engine for pod control.
//!
//! # Role in podctl
//! `podctl-core` turns streams of signed gesture deltas into two bounded
//! control values: a rudder **heading** and an engine **telegraph**. It knows
//! nothing about the platform that produced the deltas; `podctl-web` adapts
//! host gesture callbacks into the inputs consumed here.
//!
//! # Primary responsibilities
//! - **Quantizers**: stateful filters (`Threshold`, `Gain`, `Step`) that turn
//!   noisy deltas into discrete increments.
//! - **RotationPolicy**: zone-dependent quantizer selection for the heading,
//!   wrap handling, and milestone feedback.
//! - **TelegraphPolicy**: a single stepping quantizer driven by scaled pan
//!   motion, clamped to the telegraph range.
//! - **Feedback**: haptic pulse requests emitted at defined milestones.
//!
//! # How it fits in the system
//! Policies return outcome records carrying the new value and any
//! [`feedback::FeedbackEvent`]s. Delivering those events to hardware, and
//! rendering the [`readout::ControlReadout`], is the host's job.

pub mod config;
pub mod feedback;
pub mod logging;
pub mod quantizer;
pub mod readout;
pub mod rotation;
pub mod telegraph;

pub use config::{ConfigError, ControlConfig, FeedbackConfig, RotationConfig, TelegraphConfig};
pub use feedback::{FeedbackEvent, PulseKind};
pub use quantizer::{Gain, Quantize, Quantizer, QuantizerKind, Step, Threshold};
pub use readout::ControlReadout;
pub use rotation::{RotationOutcome, RotationPolicy};
pub use telegraph::{TelegraphOutcome, TelegraphPolicy};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
