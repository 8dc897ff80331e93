#![forbid(unsafe_code)]

//! Quantizers: stateful filters that turn raw deltas into discrete output.
//!
//! Every variant follows the same shape: add the incoming delta to an
//! accumulator, decide whether enough motion has built up, and possibly reset.
//! They differ only in the decision rule:
//!
//! | variant       | emits when                        | emits                     | resets |
//! |---------------|-----------------------------------|---------------------------|--------|
//! | [`Threshold`] | `|acc| > threshold`               | the triggering delta      | never  |
//! | [`Gain`]      | `|round(acc * gain)| > 0`         | the scaled accumulator    | yes    |
//! | [`Step`]      | `|acc| >= step_size`              | `±step_size`              | yes    |
//!
//! # Invariants
//!
//! 1. Every variant returns exactly `0.0` when it does not emit.
//! 2. After `reset()`, `process_change(0.0)` returns `0.0`.
//! 3. [`Threshold`] never resets on emission. Once its accumulator is past the
//!    threshold every later delta passes straight through until the owner
//!    replaces it. This matches the shipped controller's behavior and is kept
//!    as-is pending product confirmation.
//! 4. [`Gain`] only resets when it actually emits; a scaled value that rounds
//!    to zero keeps accumulating.
//!
//! Switching variants is done by replacing the whole [`Quantizer`]; state is
//! never carried from one variant into another.

/// Replace NaN and infinities with zero.
///
/// Host gesture layers occasionally report missing values; these are treated
/// as no motion rather than being propagated into control state.
#[inline]
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Round to the nearest integer, with halves going toward positive infinity.
///
/// `-0.5` rounds to `0.0` and `-1.5` to `-1.0`, matching the gesture layer
/// the controller was tuned against. A negative zero result is returned as
/// `0.0`.
#[inline]
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    let rounded = (value + 0.5).floor();
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Common contract shared by all quantizer variants.
pub trait Quantize {
    /// Feed one delta, returning the output to apply now (`0.0` for none).
    fn process_change(&mut self, delta: f64) -> f64;

    /// Discard any accumulated change.
    fn reset(&mut self);

    /// Change accumulated since the last reset.
    fn accumulated(&self) -> f64;
}

/// Discriminant of a [`Quantizer`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QuantizerKind {
    Threshold,
    Gain,
    Step,
}

impl core::fmt::Display for QuantizerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Threshold => "threshold",
            Self::Gain => "gain",
            Self::Step => "step",
        })
    }
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// Passes deltas through once the accumulated motion exceeds a dead band.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    threshold: f64,
    accumulated: f64,
}

impl Threshold {
    pub const DEFAULT_THRESHOLD: f64 = 4.0;

    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            accumulated: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl Quantize for Threshold {
    fn process_change(&mut self, delta: f64) -> f64 {
        self.accumulated += delta;
        // No reset here (see module docs, invariant 3).
        if self.accumulated.abs() > self.threshold {
            delta
        } else {
            0.0
        }
    }

    fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    fn accumulated(&self) -> f64 {
        self.accumulated
    }
}

// ---------------------------------------------------------------------------
// Gain
// ---------------------------------------------------------------------------

/// Scales accumulated motion down for fine control.
#[derive(Debug, Clone, PartialEq)]
pub struct Gain {
    gain: f64,
    round_to_int: bool,
    accumulated: f64,
}

impl Gain {
    pub const DEFAULT_GAIN: f64 = 0.5;

    #[must_use]
    pub const fn new(gain: f64, round_to_int: bool) -> Self {
        Self {
            gain,
            round_to_int,
            accumulated: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn gain(&self) -> f64 {
        self.gain
    }

    #[inline]
    #[must_use]
    pub const fn round_to_int(&self) -> bool {
        self.round_to_int
    }
}

impl Default for Gain {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GAIN, true)
    }
}

impl Quantize for Gain {
    fn process_change(&mut self, delta: f64) -> f64 {
        self.accumulated += delta;
        let scaled = self.accumulated * self.gain;
        let change = if self.round_to_int {
            round_half_up(scaled)
        } else {
            scaled
        };
        if change.abs() > 0.0 {
            self.reset();
            change
        } else {
            0.0
        }
    }

    fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    fn accumulated(&self) -> f64 {
        self.accumulated
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// Emits fixed-size increments once enough motion has accumulated.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    step_size: f64,
    accumulated: f64,
}

impl Step {
    pub const DEFAULT_STEP_SIZE: f64 = 5.0;

    #[must_use]
    pub const fn new(step_size: f64) -> Self {
        Self {
            step_size,
            accumulated: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn step_size(&self) -> f64 {
        self.step_size
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP_SIZE)
    }
}

impl Quantize for Step {
    fn process_change(&mut self, delta: f64) -> f64 {
        self.accumulated += delta;
        if self.accumulated.abs() >= self.step_size {
            self.reset();
            // Direction follows the delta that tripped the step, not the total.
            if delta > 0.0 {
                self.step_size
            } else {
                -self.step_size
            }
        } else {
            0.0
        }
    }

    fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    fn accumulated(&self) -> f64 {
        self.accumulated
    }
}

// ---------------------------------------------------------------------------
// Quantizer
// ---------------------------------------------------------------------------

/// One live quantizer of any variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantizer {
    Threshold(Threshold),
    Gain(Gain),
    Step(Step),
}

impl Quantizer {
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> QuantizerKind {
        match self {
            Self::Threshold(_) => QuantizerKind::Threshold,
            Self::Gain(_) => QuantizerKind::Gain,
            Self::Step(_) => QuantizerKind::Step,
        }
    }
}

impl Quantize for Quantizer {
    fn process_change(&mut self, delta: f64) -> f64 {
        match self {
            Self::Threshold(q) => q.process_change(delta),
            Self::Gain(q) => q.process_change(delta),
            Self::Step(q) => q.process_change(delta),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Threshold(q) => q.reset(),
            Self::Gain(q) => q.reset(),
            Self::Step(q) => q.reset(),
        }
    }

    fn accumulated(&self) -> f64 {
        match self {
            Self::Threshold(q) => q.accumulated(),
            Self::Gain(q) => q.accumulated(),
            Self::Step(q) => q.accumulated(),
        }
    }
}

impl From<Threshold> for Quantizer {
    fn from(q: Threshold) -> Self {
        Self::Threshold(q)
    }
}

impl From<Gain> for Quantizer {
    fn from(q: Gain) -> Self {
        Self::Gain(q)
    }
}

impl From<Step> for Quantizer {
    fn from(q: Step) -> Self {
        Self::Step(q)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
