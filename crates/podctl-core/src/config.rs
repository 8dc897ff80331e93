#![forbid(unsafe_code)]

//! Tuning parameters for the control policies.
//!
//! Defaults reproduce the stock feel of the pod controller: a 9° dead band
//! around center, quarter-gain fine control within ±10°, 5° steps beyond
//! that, and 5% telegraph steps.

use crate::quantizer::{Gain, Quantizer, QuantizerKind, Step, Threshold};

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A quantizer parameter was negative, zero where it must be positive, or non-finite.
    InvalidParameter { name: &'static str, value: f64 },
    /// Telegraph range with `min > max`.
    InvertedRange { min: i32, max: i32 },
    /// Telegraph range not inside `[-100, 100]` or not containing zero.
    RangeOutOfBounds { min: i32, max: i32 },
    /// Fine-control zone limit must be positive.
    InvalidZoneLimit(i32),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid value for {name}: {value}")
            }
            Self::InvertedRange { min, max } => {
                write!(f, "telegraph range is inverted: min {min} > max {max}")
            }
            Self::RangeOutOfBounds { min, max } => write!(
                f,
                "telegraph range [{min}, {max}] must lie within [{}, {}] and include 0",
                TelegraphConfig::LIMIT_MIN,
                TelegraphConfig::LIMIT_MAX
            ),
            Self::InvalidZoneLimit(limit) => {
                write!(f, "fine zone limit must be positive, got {limit}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

/// Heading quantizer parameters and zone boundaries.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RotationConfig {
    /// Dead band applied while the heading sits at center (default: 9.0).
    pub center_threshold: f64,
    /// Gain used inside the fine-control zone (default: 0.25).
    pub fine_gain: f64,
    /// Round fine-control output to whole degrees (default: true).
    pub fine_round_to_int: bool,
    /// Step size used outside the fine-control zone (default: 5.0).
    pub coarse_step: f64,
    /// Boundary of the fine-control zone, in degrees either side of center (default: 10).
    pub fine_zone_limit: i32,
    /// Headings that request a short pulse when reached (default: 30, 60, 90, 180).
    pub milestones: Vec<i32>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            center_threshold: 9.0,
            fine_gain: 0.25,
            fine_round_to_int: true,
            coarse_step: 5.0,
            fine_zone_limit: 10,
            milestones: vec![30, 60, 90, 180],
        }
    }
}

impl RotationConfig {
    /// Build a fresh quantizer of `kind` with this configuration's parameters.
    #[must_use]
    pub fn quantizer_for(&self, kind: QuantizerKind) -> Quantizer {
        match kind {
            QuantizerKind::Threshold => Quantizer::Threshold(Threshold::new(self.center_threshold)),
            QuantizerKind::Gain => {
                Quantizer::Gain(Gain::new(self.fine_gain, self.fine_round_to_int))
            }
            QuantizerKind::Step => Quantizer::Step(Step::new(self.coarse_step)),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // A zero dead band is allowed: any motion leaves center immediately.
        if !self.center_threshold.is_finite() || self.center_threshold < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "rotation.center_threshold",
                value: self.center_threshold,
            });
        }
        check_positive("rotation.fine_gain", self.fine_gain)?;
        check_positive("rotation.coarse_step", self.coarse_step)?;
        if self.fine_zone_limit <= 0 {
            return Err(ConfigError::InvalidZoneLimit(self.fine_zone_limit));
        }
        Ok(())
    }
}

/// Telegraph quantizer parameters and range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TelegraphConfig {
    /// Percentage step per emitted increment (default: 5.0).
    pub step: f64,
    /// Lower bound of the telegraph, within `-100..=0` (default: -100).
    pub min: i32,
    /// Upper bound of the telegraph, within `0..=100` (default: 100).
    pub max: i32,
    /// Screen height is divided by this to get pixels per pan unit (default: 200.0).
    pub screen_divisor: f64,
}

impl Default for TelegraphConfig {
    fn default() -> Self {
        Self {
            step: 5.0,
            min: -100,
            max: 100,
            screen_divisor: 200.0,
        }
    }
}

impl TelegraphConfig {
    /// Lowest permitted `min`: full astern.
    pub const LIMIT_MIN: i32 = -100;
    /// Highest permitted `max`: full ahead.
    pub const LIMIT_MAX: i32 = 100;

    fn validate(&self) -> Result<(), ConfigError> {
        check_positive("telegraph.step", self.step)?;
        check_positive("telegraph.screen_divisor", self.screen_divisor)?;
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                min: self.min,
                max: self.max,
            });
        }
        // Zero must stay reachable or the stop pulse can never fire.
        if self.min < Self::LIMIT_MIN || self.max > Self::LIMIT_MAX || self.min > 0 || self.max < 0
        {
            return Err(ConfigError::RangeOutOfBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Haptic pulse durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeedbackConfig {
    /// Pulse for returning to center (default: 500ms).
    pub long_pulse_ms: u64,
    /// Pulse for heading milestones (default: 200ms).
    pub short_pulse_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            long_pulse_ms: 500,
            short_pulse_ms: 200,
        }
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlConfig {
    pub rotation: RotationConfig,
    pub telegraph: TelegraphConfig,
    pub feedback: FeedbackConfig,
}

impl ControlConfig {
    /// Replace the rotation parameters.
    #[must_use]
    pub fn with_rotation(mut self, rotation: RotationConfig) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replace the telegraph parameters.
    #[must_use]
    pub fn with_telegraph(mut self, telegraph: TelegraphConfig) -> Self {
        self.telegraph = telegraph;
        self
    }

    /// Replace the pulse durations.
    #[must_use]
    pub fn with_feedback(mut self, feedback: FeedbackConfig) -> Self {
        self.feedback = feedback;
        self
    }

    /// Check every parameter, returning the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rotation.validate()?;
        self.telegraph.validate()
    }
}
