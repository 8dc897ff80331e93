#![forbid(unsafe_code)]

//! Deterministic gesture adapter for rotation/pan pod control.
//!
//! This module turns host gesture callbacks into deltas for the heading and
//! telegraph policies while enforcing:
//! - rotation and pan never feed their policies at the same time,
//! - pan is disabled for the whole rotation gesture and re-enabled only when
//!   the gesture finalizes, and
//! - a pan touched with more than one pointer disables itself (a mis-touch,
//!   not an error).
//!
//! Host gesture values are cumulative since the gesture began. The adapter
//! keeps the previous sample per gesture kind and forwards only the
//! difference. Non-finite host values are treated as zero.

use core::f64::consts::PI;

use podctl_core::quantizer::{finite_or_zero, round_half_up};
use podctl_core::{
    ControlConfig, ControlReadout, FeedbackEvent, RotationPolicy, TelegraphPolicy,
};
// Resolves to tracing macros or no-ops depending on podctl-core's features.
use podctl_core::{debug, trace};

/// One host gesture callback.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum GestureInput {
    /// Rotation recognizer activated; `rotation` is its current value in radians.
    RotationStart { rotation: f64 },
    /// Rotation moved; `rotation` is cumulative radians since start.
    RotationUpdate { rotation: f64 },
    /// Pan recognizer activated with `pointers` touches down.
    PanStart { pointers: u32 },
    /// Pan moved; `translation_y` is cumulative pixels since start (down is positive).
    PanUpdate { translation_y: f64, pointers: u32 },
    /// Any gesture ended, failed or was cancelled.
    Finalize,
}

/// Command for the host's pan recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PanCommand {
    Enable,
    Disable,
}

impl PanCommand {
    #[must_use]
    pub const fn enabled(self) -> bool {
        matches!(self, Self::Enable)
    }
}

/// Lifecycle phase recorded for one adapter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GesturePhase {
    RotationStart,
    RotationUpdate,
    PanStart,
    PanUpdate,
    Finalize,
}

/// Deterministic reason why an incoming callback was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GestureIgnoredReason {
    /// Pan callback while the pan recognizer is disabled.
    PanDisabled,
    /// Pan callback while a rotation gesture owns the surface.
    RotationInProgress,
    /// Rotation callback while a pan gesture owns the surface.
    PanInProgress,
    /// More than one pointer on a pan; pan disables itself.
    MultiplePointers,
    /// Sample produced no whole-unit motion.
    ZeroDelta,
    /// Update without a matching start.
    NoActiveGesture,
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GestureLogOutcome {
    /// A delta reached a policy.
    Applied,
    /// Gesture bookkeeping changed; no delta forwarded.
    StateUpdated,
    Ignored(GestureIgnoredReason),
}

/// Structured log record for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureLogEntry {
    pub phase: GesturePhase,
    pub sequence: u64,
    /// Normalized delta forwarded to a policy (degrees or pan units).
    pub delta: Option<f64>,
    pub pan_command: Option<PanCommand>,
    /// Control state after the dispatch.
    pub readout: ControlReadout,
    pub outcome: GestureLogOutcome,
}

/// Result of one host callback.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureDispatch {
    /// Haptic pulses to request, in order.
    pub feedback: Vec<FeedbackEvent>,
    /// Pan recognizer toggle the host must apply.
    pub pan_command: Option<PanCommand>,
    pub log: GestureLogEntry,
}

impl GestureDispatch {
    /// Whether a delta reached a policy.
    #[must_use]
    pub fn applied(&self) -> bool {
        matches!(self.log.outcome, GestureLogOutcome::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveGesture {
    Rotation,
    Pan,
}

/// Convert radians to whole degrees.
#[inline]
#[must_use]
pub fn whole_degrees(radians: f64) -> f64 {
    round_half_up(finite_or_zero(radians) / PI * 180.0)
}

/// Arbitrates rotation and pan gestures and feeds the control policies.
#[derive(Debug, Clone)]
pub struct GestureAdapter {
    rotation: RotationPolicy,
    telegraph: TelegraphPolicy,
    active: Option<ActiveGesture>,
    pan_enabled: bool,
    prev_rotation: f64,
    prev_pan: f64,
    next_sequence: u64,
}

impl GestureAdapter {
    /// Build an adapter for a screen `screen_height` pixels tall.
    #[must_use]
    pub fn new(config: ControlConfig, screen_height: f64) -> Self {
        let ControlConfig {
            rotation,
            telegraph,
            feedback,
        } = config;
        Self {
            rotation: RotationPolicy::new(rotation, feedback),
            telegraph: TelegraphPolicy::new(telegraph, feedback, screen_height),
            active: None,
            pan_enabled: true,
            prev_rotation: 0.0,
            prev_pan: 0.0,
            next_sequence: 1,
        }
    }

    #[inline]
    #[must_use]
    pub const fn heading(&self) -> i32 {
        self.rotation.heading()
    }

    #[inline]
    #[must_use]
    pub const fn telegraph(&self) -> i32 {
        self.telegraph.telegraph()
    }

    #[inline]
    #[must_use]
    pub const fn readout(&self) -> ControlReadout {
        ControlReadout::new(self.heading(), self.telegraph())
    }

    /// Whether the adapter currently accepts pan callbacks.
    #[inline]
    #[must_use]
    pub const fn pan_enabled(&self) -> bool {
        self.pan_enabled
    }

    /// Whether a rotation gesture currently owns the surface.
    #[inline]
    #[must_use]
    pub fn rotation_active(&self) -> bool {
        self.active == Some(ActiveGesture::Rotation)
    }

    /// Whether a pan gesture currently owns the surface.
    #[inline]
    #[must_use]
    pub fn pan_active(&self) -> bool {
        self.active == Some(ActiveGesture::Pan)
    }

    #[must_use]
    pub fn rotation_policy(&self) -> &RotationPolicy {
        &self.rotation
    }

    #[must_use]
    pub fn telegraph_policy(&self) -> &TelegraphPolicy {
        &self.telegraph
    }

    /// Recompute the pan scale after the host screen changed size.
    pub fn set_screen_height(&mut self, screen_height: f64) {
        self.telegraph.set_screen_height(screen_height);
    }

    /// Route one [`GestureInput`] to its callback.
    pub fn dispatch(&mut self, input: GestureInput) -> GestureDispatch {
        match input {
            GestureInput::RotationStart { rotation } => self.on_rotation_start(rotation),
            GestureInput::RotationUpdate { rotation } => self.on_rotation_update(rotation),
            GestureInput::PanStart { pointers } => self.on_pan_start(pointers),
            GestureInput::PanUpdate {
                translation_y,
                pointers,
            } => self.on_pan_update(translation_y, pointers),
            GestureInput::Finalize => self.on_gesture_finalize(),
        }
    }

    /// Rotation recognizer activated. Claims the surface and disables pan.
    pub fn on_rotation_start(&mut self, rotation_radians: f64) -> GestureDispatch {
        let phase = GesturePhase::RotationStart;
        if self.pan_active() {
            return self.ignored(phase, GestureIgnoredReason::PanInProgress, None);
        }
        self.active = Some(ActiveGesture::Rotation);
        self.prev_rotation = whole_degrees(rotation_radians);
        let command = self.set_pan_enabled(false);
        self.finish(phase, None, Vec::new(), command, GestureLogOutcome::StateUpdated)
    }

    /// Rotation moved to `rotation_radians` (cumulative since start).
    pub fn on_rotation_update(&mut self, rotation_radians: f64) -> GestureDispatch {
        let phase = GesturePhase::RotationUpdate;
        match self.active {
            Some(ActiveGesture::Rotation) => {}
            Some(ActiveGesture::Pan) => {
                return self.ignored(phase, GestureIgnoredReason::PanInProgress, None);
            }
            None => return self.ignored(phase, GestureIgnoredReason::NoActiveGesture, None),
        }

        let degrees = whole_degrees(rotation_radians);
        let change = degrees - self.prev_rotation;
        self.prev_rotation = degrees;
        if change == 0.0 {
            return self.ignored(phase, GestureIgnoredReason::ZeroDelta, None);
        }

        let outcome = self.rotation.apply(change);
        self.finish(
            phase,
            Some(change),
            outcome.feedback,
            None,
            GestureLogOutcome::Applied,
        )
    }

    /// Pan recognizer activated with `active_pointers` touches down.
    pub fn on_pan_start(&mut self, active_pointers: u32) -> GestureDispatch {
        let phase = GesturePhase::PanStart;
        if let Some(dispatch) = self.reject_pan(phase, active_pointers) {
            return dispatch;
        }
        self.active = Some(ActiveGesture::Pan);
        self.prev_pan = 0.0;
        self.finish(phase, None, Vec::new(), None, GestureLogOutcome::StateUpdated)
    }

    /// Pan moved to `translation_y` pixels (cumulative since start).
    pub fn on_pan_update(&mut self, translation_y: f64, active_pointers: u32) -> GestureDispatch {
        let phase = GesturePhase::PanUpdate;
        if let Some(dispatch) = self.reject_pan(phase, active_pointers) {
            return dispatch;
        }
        if !self.pan_active() {
            return self.ignored(phase, GestureIgnoredReason::NoActiveGesture, None);
        }

        let translation_y = finite_or_zero(translation_y);
        // Dragging up (negative translation) pushes the telegraph ahead.
        let raw = self.prev_pan - translation_y;
        self.prev_pan = translation_y;
        let delta = self.telegraph.scale_pixels(raw);
        if delta == 0.0 {
            return self.ignored(phase, GestureIgnoredReason::ZeroDelta, None);
        }

        let outcome = self.telegraph.apply(delta);
        self.finish(
            phase,
            Some(delta),
            outcome.feedback,
            None,
            GestureLogOutcome::Applied,
        )
    }

    /// A gesture ended. Releases the surface and re-enables pan.
    pub fn on_gesture_finalize(&mut self) -> GestureDispatch {
        self.active = None;
        let command = self.set_pan_enabled(true);
        self.finish(
            GesturePhase::Finalize,
            None,
            Vec::new(),
            command,
            GestureLogOutcome::StateUpdated,
        )
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Shared pan guards: disabled recognizer, rotation ownership, extra pointers.
    fn reject_pan(&mut self, phase: GesturePhase, active_pointers: u32) -> Option<GestureDispatch> {
        if !self.pan_enabled {
            return Some(self.ignored(phase, GestureIgnoredReason::PanDisabled, None));
        }
        if self.rotation_active() {
            return Some(self.ignored(phase, GestureIgnoredReason::RotationInProgress, None));
        }
        if active_pointers > 1 {
            debug!(pointers = active_pointers, "pan disabled: multiple pointers");
            if self.pan_active() {
                self.active = None;
            }
            let command = self.set_pan_enabled(false);
            return Some(self.ignored(phase, GestureIgnoredReason::MultiplePointers, command));
        }
        None
    }

    fn set_pan_enabled(&mut self, enabled: bool) -> Option<PanCommand> {
        if self.pan_enabled == enabled {
            return None;
        }
        self.pan_enabled = enabled;
        debug!(enabled, "pan recognizer toggled");
        Some(if enabled {
            PanCommand::Enable
        } else {
            PanCommand::Disable
        })
    }

    fn ignored(
        &mut self,
        phase: GesturePhase,
        reason: GestureIgnoredReason,
        pan_command: Option<PanCommand>,
    ) -> GestureDispatch {
        trace!(?phase, ?reason, "gesture callback ignored");
        self.finish(
            phase,
            None,
            Vec::new(),
            pan_command,
            GestureLogOutcome::Ignored(reason),
        )
    }

    fn finish(
        &mut self,
        phase: GesturePhase,
        delta: Option<f64>,
        feedback: Vec<FeedbackEvent>,
        pan_command: Option<PanCommand>,
        outcome: GestureLogOutcome,
    ) -> GestureDispatch {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        GestureDispatch {
            feedback,
            pan_command,
            log: GestureLogEntry {
                phase,
                sequence,
                delta,
                pan_command,
                readout: self.readout(),
                outcome,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podctl_core::PulseKind;
    use pretty_assertions::assert_eq;

    const SCREEN: f64 = 800.0; // pan scale 4

    fn adapter() -> GestureAdapter {
        GestureAdapter::new(ControlConfig::default(), SCREEN)
    }

    fn rad(degrees: f64) -> f64 {
        degrees / 180.0 * PI
    }

    fn outcome(d: &GestureDispatch) -> GestureLogOutcome {
        d.log.outcome
    }

    // --- conversions ---

    #[test]
    fn whole_degrees_rounds() {
        assert_eq!(whole_degrees(PI), 180.0);
        assert_eq!(whole_degrees(rad(10.4)), 10.0);
        assert_eq!(whole_degrees(-PI / 2.0), -90.0);
        assert_eq!(whole_degrees(rad(-10.6)), -11.0);
        assert_eq!(whole_degrees(rad(-0.4)), 0.0);
        assert_eq!(whole_degrees(f64::NAN), 0.0);
    }

    // --- rotation ---

    #[test]
    fn rotation_start_disables_pan() {
        let mut a = adapter();
        let d = a.on_rotation_start(0.0);
        assert_eq!(d.pan_command, Some(PanCommand::Disable));
        assert_eq!(outcome(&d), GestureLogOutcome::StateUpdated);
        assert!(!a.pan_enabled());
        assert!(a.rotation_active());
    }

    #[test]
    fn rotation_updates_forward_degree_differences() {
        let mut a = adapter();
        a.on_rotation_start(0.0);
        let d = a.on_rotation_update(rad(5.0));
        assert_eq!(d.log.delta, Some(5.0));
        assert_eq!(a.heading(), 0);
        let d = a.on_rotation_update(rad(10.0));
        assert_eq!(d.log.delta, Some(5.0));
        // 10° accumulated > 9° dead band: the triggering 5° passes through.
        assert_eq!(a.heading(), 5);
        assert!(d.applied());
    }

    #[test]
    fn rotation_zero_difference_is_skipped() {
        let mut a = adapter();
        a.on_rotation_start(0.0);
        a.on_rotation_update(rad(3.0));
        let d = a.on_rotation_update(rad(3.2));
        assert_eq!(
            outcome(&d),
            GestureLogOutcome::Ignored(GestureIgnoredReason::ZeroDelta)
        );
    }

    #[test]
    fn rotation_start_value_is_the_baseline() {
        let mut a = adapter();
        a.on_rotation_start(rad(20.0));
        let d = a.on_rotation_update(rad(22.0));
        assert_eq!(d.log.delta, Some(2.0));
    }

    #[test]
    fn rotation_update_without_start_is_ignored() {
        let mut a = adapter();
        let d = a.on_rotation_update(rad(30.0));
        assert_eq!(
            outcome(&d),
            GestureLogOutcome::Ignored(GestureIgnoredReason::NoActiveGesture)
        );
        assert_eq!(a.heading(), 0);
    }

    #[test]
    fn rotation_non_finite_sample_counts_as_zero() {
        let mut a = adapter();
        a.on_rotation_start(0.0);
        a.on_rotation_update(rad(4.0));
        let d = a.on_rotation_update(f64::NAN);
        assert_eq!(d.log.delta, Some(-4.0));
    }

    #[test]
    fn heading_back_to_zero_requests_long_pulse() {
        let mut a = adapter();
        a.on_rotation_start(0.0);
        a.on_rotation_update(rad(5.0));
        a.on_rotation_update(rad(10.0));
        assert_eq!(a.heading(), 5);
        let d = a.on_rotation_update(rad(-10.0));
        assert_eq!(a.heading(), 0);
        assert_eq!(d.feedback.len(), 1);
        assert_eq!(d.feedback[0].kind, PulseKind::Long);
    }

    // --- pan ---

    #[test]
    fn pan_drag_up_raises_telegraph() {
        let mut a = adapter();
        a.on_pan_start(1);
        // 20px up at scale 4 = 5 units = one step.
        let d = a.on_pan_update(-20.0, 1);
        assert_eq!(d.log.delta, Some(5.0));
        assert_eq!(a.telegraph(), 5);
        let d = a.on_pan_update(0.0, 1);
        assert_eq!(d.log.delta, Some(-5.0));
        assert_eq!(a.telegraph(), 0);
        assert_eq!(d.feedback.len(), 1);
    }

    #[test]
    fn pan_small_motion_is_skipped() {
        let mut a = adapter();
        a.on_pan_start(1);
        let d = a.on_pan_update(-1.0, 1);
        assert_eq!(
            outcome(&d),
            GestureLogOutcome::Ignored(GestureIgnoredReason::ZeroDelta)
        );
    }

    #[test]
    fn pan_multiple_pointers_disables_pan() {
        let mut a = adapter();
        a.on_pan_start(1);
        let d = a.on_pan_update(-20.0, 2);
        assert_eq!(d.pan_command, Some(PanCommand::Disable));
        assert_eq!(
            outcome(&d),
            GestureLogOutcome::Ignored(GestureIgnoredReason::MultiplePointers)
        );
        assert_eq!(a.telegraph(), 0);
        assert!(!a.pan_enabled());

        let d = a.on_pan_update(-40.0, 1);
        assert_eq!(
            outcome(&d),
            GestureLogOutcome::Ignored(GestureIgnoredReason::PanDisabled)
        );
    }

    #[test]
    fn pan_start_with_multiple_pointers_disables_pan() {
        let mut a = adapter();
        let d = a.on_pan_start(2);
        assert_eq!(d.pan_command, Some(PanCommand::Disable));
        assert!(!a.pan_active());
    }

    #[test]
    fn pan_update_without_start_is_ignored() {
        let mut a = adapter();
        let d = a.on_pan_update(-20.0, 1);
        assert_eq!(
            outcome(&d),
            GestureLogOutcome::Ignored(GestureIgnoredReason::NoActiveGesture)
        );
    }

    #[test]
    fn pan_start_resets_baseline() {
        let mut a = adapter();
        a.on_pan_start(1);
        a.on_pan_update(-20.0, 1);
        a.on_gesture_finalize();
        a.on_pan_start(1);
        let d = a.on_pan_update(-20.0, 1);
        assert_eq!(d.log.delta, Some(5.0));
        assert_eq!(a.telegraph(), 10);
    }

    // --- exclusivity ---

    #[test]
    fn pan_ignored_during_rotation() {
        let mut a = adapter();
        a.on_rotation_start(0.0);
        let d = a.on_pan_start(1);
        assert_eq!(
            outcome(&d),
            GestureLogOutcome::Ignored(GestureIgnoredReason::PanDisabled)
        );
        assert_eq!(d.pan_command, None);
    }

    #[test]
    fn rotation_ignored_during_pan() {
        let mut a = adapter();
        a.on_pan_start(1);
        let d = a.on_rotation_start(0.0);
        assert_eq!(
            outcome(&d),
            GestureLogOutcome::Ignored(GestureIgnoredReason::PanInProgress)
        );
        assert!(a.pan_enabled());
        let d = a.on_rotation_update(rad(30.0));
        assert_eq!(
            outcome(&d),
            GestureLogOutcome::Ignored(GestureIgnoredReason::PanInProgress)
        );
    }

    #[test]
    fn finalize_re_enables_pan_once() {
        let mut a = adapter();
        a.on_rotation_start(0.0);
        let d = a.on_gesture_finalize();
        assert_eq!(d.pan_command, Some(PanCommand::Enable));
        assert!(a.pan_enabled());
        let d = a.on_gesture_finalize();
        assert_eq!(d.pan_command, None);
    }

    #[test]
    fn finalize_recovers_from_mis_touch() {
        let mut a = adapter();
        a.on_pan_start(2);
        a.on_gesture_finalize();
        a.on_pan_start(1);
        a.on_pan_update(-20.0, 1);
        assert_eq!(a.telegraph(), 5);
    }

    // --- log ---

    #[test]
    fn sequence_numbers_increase_for_every_callback() {
        let mut a = adapter();
        let seqs: Vec<u64> = [
            GestureInput::PanStart { pointers: 1 },
            GestureInput::PanUpdate {
                translation_y: -1.0,
                pointers: 1,
            },
            GestureInput::Finalize,
            GestureInput::RotationUpdate { rotation: 1.0 },
        ]
        .into_iter()
        .map(|input| a.dispatch(input).log.sequence)
        .collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn log_entry_carries_readout() {
        let mut a = adapter();
        a.on_pan_start(1);
        let d = a.on_pan_update(-20.0, 1);
        assert_eq!(
            d.log,
            GestureLogEntry {
                phase: GesturePhase::PanUpdate,
                sequence: 2,
                delta: Some(5.0),
                pan_command: None,
                readout: ControlReadout::new(0, 5),
                outcome: GestureLogOutcome::Applied,
            }
        );
    }
}
