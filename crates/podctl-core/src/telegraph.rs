#![forbid(unsafe_code)]

//! Engine telegraph driven by vertical pan motion.
//!
//! Unlike the heading, the telegraph uses one persistent [`Step`] quantizer:
//! there are no zones. Raw pixel motion is first divided by a screen-derived
//! scale so that the same physical drag length moves the telegraph by the same
//! amount on every device.

use crate::config::{FeedbackConfig, TelegraphConfig};
use crate::feedback::FeedbackEvent;
use crate::quantizer::{Quantize, Step, finite_or_zero, round_half_up};

#[cfg(feature = "tracing")]
use crate::logging::trace;
#[cfg(not(feature = "tracing"))]
use crate::trace;

/// Pixels per pan unit for a screen of `screen_height` pixels.
///
/// `floor(screen_height / divisor)`, never less than 1 so small or unknown
/// screens do not divide by zero.
#[must_use]
pub fn pan_scale(screen_height: f64, divisor: f64) -> f64 {
    let scale = finite_or_zero((screen_height / divisor).floor());
    scale.max(1.0)
}

/// Result of feeding one pan delta.
#[derive(Debug, Clone, PartialEq)]
pub struct TelegraphOutcome {
    pub previous: i32,
    pub telegraph: i32,
    /// Quantizer output before clamping.
    pub emitted: i32,
    pub feedback: Vec<FeedbackEvent>,
}

impl TelegraphOutcome {
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.telegraph != self.previous
    }
}

/// Telegraph owner.
#[derive(Debug, Clone)]
pub struct TelegraphPolicy {
    config: TelegraphConfig,
    feedback: FeedbackConfig,
    quantizer: Step,
    scale: f64,
    telegraph: i32,
}

impl TelegraphPolicy {
    /// Telegraph starts at zero (stop) for a screen `screen_height` pixels tall.
    #[must_use]
    pub fn new(config: TelegraphConfig, feedback: FeedbackConfig, screen_height: f64) -> Self {
        Self {
            quantizer: Step::new(config.step),
            scale: pan_scale(screen_height, config.screen_divisor),
            config,
            feedback,
            telegraph: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn telegraph(&self) -> i32 {
        self.telegraph
    }

    /// Pixels per pan unit currently in effect.
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Recompute the pan scale after the host screen changed size.
    pub fn set_screen_height(&mut self, screen_height: f64) {
        self.scale = pan_scale(screen_height, self.config.screen_divisor);
    }

    /// Convert raw pixel motion into whole pan units.
    #[must_use]
    pub fn scale_pixels(&self, raw_pixel_delta: f64) -> f64 {
        finite_or_zero(round_half_up(finite_or_zero(raw_pixel_delta) / self.scale))
    }

    /// Feed raw pixel motion (positive = toward ahead).
    pub fn apply_pixels(&mut self, raw_pixel_delta: f64) -> TelegraphOutcome {
        let delta = self.scale_pixels(raw_pixel_delta);
        self.apply(delta)
    }

    /// Feed one already-scaled pan delta.
    pub fn apply(&mut self, delta: f64) -> TelegraphOutcome {
        let delta = finite_or_zero(delta);
        let previous = self.telegraph;
        let emitted = round_half_up(self.quantizer.process_change(delta)) as i32;
        // max/min rather than clamp: an unvalidated inverted range must not panic.
        let telegraph = previous
            .saturating_add(emitted)
            .max(self.config.min)
            .min(self.config.max);
        self.telegraph = telegraph;

        let mut feedback = Vec::new();
        if telegraph == 0 && previous != 0 {
            feedback.push(FeedbackEvent::long(&self.feedback));
        }

        trace!(previous, telegraph, emitted, "telegraph delta applied");

        TelegraphOutcome {
            previous,
            telegraph,
            emitted,
            feedback,
        }
    }
}
