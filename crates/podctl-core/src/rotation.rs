#![forbid(unsafe_code)]

//! Heading state machine.
//!
//! [`RotationPolicy`] owns the heading and the quantizer currently shaping
//! rotation input. On every delta it first decides which quantizer the
//! current zone demands, then feeds the delta through it.
//!
//! # Zones
//!
//! | heading                 | moving away from center | moving toward center |
//! |-------------------------|-------------------------|----------------------|
//! | `0`                     | Threshold               | Threshold            |
//! | `0 < |h| < limit`       | Gain                    | Gain                 |
//! | `|h| == limit`          | Step                    | Gain                 |
//! | `|h| > limit`           | Step                    | Step                 |
//!
//! At exactly the zone limit the direction decides: pushing outward switches
//! to coarse steps, pulling back in stays fine. A zero delta counts as moving
//! toward center on either side.
//!
//! # Invariants
//!
//! 1. The quantizer is replaced only when the zone demands a different kind.
//!    Staying in the same zone never discards accumulated motion.
//! 2. After wrapping, `|heading| <= 180`.
//! 3. At most one long pulse per call, emitted only on a nonzero → zero move.
//! 4. A short pulse fires on every applied delta that leaves the heading on a
//!    milestone, including one that does not move it.

use crate::config::{FeedbackConfig, RotationConfig};
use crate::feedback::FeedbackEvent;
use crate::quantizer::{Quantize, Quantizer, QuantizerKind, finite_or_zero, round_half_up};

// Import tracing macros (no-op when tracing feature is disabled).
#[cfg(feature = "tracing")]
use crate::logging::{debug, trace};
#[cfg(not(feature = "tracing"))]
use crate::{debug, trace};

/// Fold a raw heading back into `[-180, 180]`.
///
/// For headings in `181..=540` this is exactly `360 - heading`, the rule the
/// controller has always used: 185 becomes 175, 200 becomes 160. Headings
/// below -180 are reflected the same way about -180 (-185 becomes -175), and
/// anything further out is reduced by whole 720° periods first, which is what
/// repeatedly applying both reflections would converge to.
#[must_use]
pub fn wrap_heading(heading: i32) -> i32 {
    if (-180..=180).contains(&heading) {
        return heading;
    }
    let folded = (i64::from(heading) + 180).rem_euclid(720) - 180;
    let folded = if folded > 180 { 360 - folded } else { folded };
    folded as i32
}

/// Quantizer kind demanded by the zone `heading` sits in, given the motion
/// direction of `delta`.
#[must_use]
pub fn demanded_kind(heading: i32, delta: f64, limit: i32) -> QuantizerKind {
    use core::cmp::Ordering;

    let fine = match heading.cmp(&0) {
        Ordering::Equal => return QuantizerKind::Threshold,
        Ordering::Greater if delta > 0.0 => heading < limit,
        Ordering::Greater => heading <= limit,
        Ordering::Less if delta < 0.0 => heading > -limit,
        Ordering::Less => heading >= -limit,
    };
    if fine {
        QuantizerKind::Gain
    } else {
        QuantizerKind::Step
    }
}

/// Result of feeding one rotation delta.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationOutcome {
    /// Heading before this delta.
    pub previous: i32,
    /// Heading after quantizing and wrapping.
    pub heading: i32,
    /// Raw quantizer output, before wrapping.
    pub emitted: i32,
    /// Quantizer that processed the delta.
    pub active: QuantizerKind,
    /// Set when the zone forced a new quantizer for this delta.
    pub switched_to: Option<QuantizerKind>,
    /// Pulses to request from the host.
    pub feedback: Vec<FeedbackEvent>,
}

impl RotationOutcome {
    /// Whether the heading moved.
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.heading != self.previous
    }
}

/// Heading owner and zone-based quantizer selector.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    config: RotationConfig,
    feedback: FeedbackConfig,
    heading: i32,
    active: Option<Quantizer>,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::new(RotationConfig::default(), FeedbackConfig::default())
    }
}

impl RotationPolicy {
    /// Heading starts centered with no quantizer; the first delta installs
    /// the center dead band.
    #[must_use]
    pub fn new(config: RotationConfig, feedback: FeedbackConfig) -> Self {
        Self {
            config,
            feedback,
            heading: 0,
            active: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn heading(&self) -> i32 {
        self.heading
    }

    /// The live quantizer, if any delta has been processed yet.
    #[inline]
    #[must_use]
    pub fn active(&self) -> Option<&Quantizer> {
        self.active.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn active_kind(&self) -> Option<QuantizerKind> {
        self.active.as_ref().map(Quantizer::kind)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// Feed one rotation delta in degrees.
    pub fn apply(&mut self, delta: f64) -> RotationOutcome {
        let delta = finite_or_zero(delta);
        let previous = self.heading;

        let kind = demanded_kind(previous, delta, self.config.fine_zone_limit);
        let switched_to = if self.active_kind() == Some(kind) {
            None
        } else {
            debug!(heading = previous, kind = %kind, "rotation quantizer switched");
            self.active = Some(self.config.quantizer_for(kind));
            Some(kind)
        };

        let emitted = round_half_up(
            self.active
                .as_mut()
                .map_or(0.0, |q| q.process_change(delta)),
        ) as i32;
        let heading = wrap_heading(previous.saturating_add(emitted));
        self.heading = heading;

        let mut feedback = Vec::new();
        if heading == 0 && previous != 0 {
            feedback.push(FeedbackEvent::long(&self.feedback));
        }
        if self.config.milestones.contains(&heading) {
            feedback.push(FeedbackEvent::short(&self.feedback));
        }

        trace!(
            previous,
            heading,
            emitted,
            pulses = feedback.len(),
            "rotation delta applied"
        );

        RotationOutcome {
            previous,
            heading,
            emitted,
            active: kind,
            switched_to,
            feedback,
        }
    }
}
