#![forbid(unsafe_code)]

//! Host services and the driver that applies dispatch results to them.

use core::time::Duration;

use podctl_core::{ControlConfig, ControlReadout};

use crate::gesture_adapter::{GestureAdapter, GestureDispatch, GestureInput};

/// Primitive services provided by the embedding UI layer.
pub trait HostServices {
    /// Screen height in pixels, used to scale pan motion.
    fn screen_height(&self) -> f64;

    /// Fire-and-forget vibration request.
    fn request_haptic_pulse(&mut self, duration: Duration);

    /// Enable or disable the host's pan recognizer.
    fn set_pan_enabled(&mut self, enabled: bool);
}

/// A [`GestureAdapter`] wired to a host.
///
/// Each callback runs the adapter, then forwards the resulting pulses and pan
/// toggles to the host before returning the dispatch for inspection.
#[derive(Debug)]
pub struct PodControl<H: HostServices> {
    adapter: GestureAdapter,
    host: H,
}

impl<H: HostServices> PodControl<H> {
    #[must_use]
    pub fn new(config: ControlConfig, host: H) -> Self {
        let adapter = GestureAdapter::new(config, host.screen_height());
        Self { adapter, host }
    }

    #[must_use]
    pub const fn heading(&self) -> i32 {
        self.adapter.heading()
    }

    #[must_use]
    pub const fn telegraph(&self) -> i32 {
        self.adapter.telegraph()
    }

    #[must_use]
    pub const fn readout(&self) -> ControlReadout {
        self.adapter.readout()
    }

    #[must_use]
    pub fn adapter(&self) -> &GestureAdapter {
        &self.adapter
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    /// Re-read the host screen height (after rotation or resize).
    pub fn screen_resized(&mut self) {
        self.adapter.set_screen_height(self.host.screen_height());
    }

    pub fn on_rotation_start(&mut self, rotation_radians: f64) -> GestureDispatch {
        let dispatch = self.adapter.on_rotation_start(rotation_radians);
        self.deliver(dispatch)
    }

    pub fn on_rotation_update(&mut self, rotation_radians: f64) -> GestureDispatch {
        let dispatch = self.adapter.on_rotation_update(rotation_radians);
        self.deliver(dispatch)
    }

    pub fn on_pan_start(&mut self, active_pointers: u32) -> GestureDispatch {
        let dispatch = self.adapter.on_pan_start(active_pointers);
        self.deliver(dispatch)
    }

    pub fn on_pan_update(&mut self, translation_y: f64, active_pointers: u32) -> GestureDispatch {
        let dispatch = self.adapter.on_pan_update(translation_y, active_pointers);
        self.deliver(dispatch)
    }

    pub fn on_gesture_finalize(&mut self) -> GestureDispatch {
        let dispatch = self.adapter.on_gesture_finalize();
        self.deliver(dispatch)
    }

    /// Route one [`GestureInput`] to its callback.
    pub fn dispatch(&mut self, input: GestureInput) -> GestureDispatch {
        let dispatch = self.adapter.dispatch(input);
        self.deliver(dispatch)
    }

    fn deliver(&mut self, dispatch: GestureDispatch) -> GestureDispatch {
        for pulse in &dispatch.feedback {
            self.host.request_haptic_pulse(pulse.duration());
        }
        if let Some(command) = dispatch.pan_command {
            self.host.set_pan_enabled(command.enabled());
        }
        dispatch
    }
}

/// In-memory host that records every request.
///
/// Used by replay, the CLI, and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingHost {
    screen_height: f64,
    pulses: Vec<Duration>,
    pan_toggles: Vec<bool>,
}

impl RecordingHost {
    #[must_use]
    pub const fn new(screen_height: f64) -> Self {
        Self {
            screen_height,
            pulses: Vec::new(),
            pan_toggles: Vec::new(),
        }
    }

    /// Every pulse requested so far, in order.
    #[must_use]
    pub fn pulses(&self) -> &[Duration] {
        &self.pulses
    }

    /// Every pan toggle applied so far (`true` = enabled), in order.
    #[must_use]
    pub fn pan_toggles(&self) -> &[bool] {
        &self.pan_toggles
    }

    /// Current pan recognizer state as seen by the host.
    #[must_use]
    pub fn pan_enabled(&self) -> bool {
        self.pan_toggles.last().copied().unwrap_or(true)
    }

    pub fn set_screen_height(&mut self, screen_height: f64) {
        self.screen_height = screen_height;
    }
}

impl HostServices for RecordingHost {
    fn screen_height(&self) -> f64 {
        self.screen_height
    }

    fn request_haptic_pulse(&mut self, duration: Duration) {
        self.pulses.push(duration);
    }

    fn set_pan_enabled(&mut self, enabled: bool) {
        self.pan_toggles.push(enabled);
    }
}
