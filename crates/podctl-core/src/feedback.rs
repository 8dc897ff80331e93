#![forbid(unsafe_code)]

//! Haptic feedback requests.
//!
//! Policies never touch hardware. They return [`FeedbackEvent`]s and the host
//! forwards each one to its vibration service. Requests are fire-and-forget:
//! there is no acknowledgement, and overlapping pulses are the host's concern.

use core::time::Duration;

use crate::config::FeedbackConfig;

/// Which milestone pulse is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PulseKind {
    /// Returning to center (heading or telegraph reached zero).
    Long,
    /// Heading landed on a milestone angle.
    Short,
}

/// A single haptic pulse request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedbackEvent {
    pub kind: PulseKind,
    pub duration_ms: u64,
}

impl FeedbackEvent {
    /// Long pulse using the configured duration.
    #[must_use]
    pub const fn long(config: &FeedbackConfig) -> Self {
        Self {
            kind: PulseKind::Long,
            duration_ms: config.long_pulse_ms,
        }
    }

    /// Short pulse using the configured duration.
    #[must_use]
    pub const fn short(config: &FeedbackConfig) -> Self {
        Self {
            kind: PulseKind::Short,
            duration_ms: config.short_pulse_ms,
        }
    }

    /// Requested vibration length.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl core::fmt::Display for FeedbackEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self.kind {
            PulseKind::Long => "long",
            PulseKind::Short => "short",
        };
        write!(f, "{name}({}ms)", self.duration_ms)
    }
}
