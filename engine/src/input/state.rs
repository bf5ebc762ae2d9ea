//! Control input state
//!
//! Raw axis values arrive once per frame from the host's input polling.
//! Setters normalize them so the simulation never sees out-of-range or
//! non-finite values.
//!
//! Axis conventions (input side, independent of the frame's rotation signs):
//! - `pitch`: +1 is stick back (nose up)
//! - `roll`: +1 is stick right (right wing down)
//! - `yaw`: +1 is right pedal (nose right)
//! - `throttle`: 0 idle, 1 full
//! - `movement`: free-fly (forward, right, up), each in [-1, 1]
//! - `look`: free-fly look delta (right, up) in raw device units per frame

use glam::{DVec2, DVec3};
use tracing::{trace, warn};

/// Control input for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    pitch: f64,
    roll: f64,
    yaw: f64,
    throttle: f64,
    movement: DVec3,
    look: DVec2,
    toggle_mode: bool,
}

impl ControlInput {
    /// Create an empty input: centered axes, idle throttle
    pub fn new() -> Self {
        Self {
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
            throttle: 0.0,
            movement: DVec3::ZERO,
            look: DVec2::ZERO,
            toggle_mode: false,
        }
    }

    /// Piloted input from stick, pedal and throttle values
    pub fn piloted(pitch: f64, roll: f64, yaw: f64, throttle: f64) -> Self {
        let mut input = Self::new();
        input.set_pitch(pitch);
        input.set_roll(roll);
        input.set_yaw(yaw);
        input.set_throttle(throttle);
        input
    }

    /// Free-fly input from a movement vector and a look delta
    pub fn free_fly(movement: DVec3, look: DVec2) -> Self {
        let mut input = Self::new();
        input.set_movement(movement);
        input.add_look_delta(look.x, look.y);
        input
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn roll(&self) -> f64 {
        self.roll
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn movement(&self) -> DVec3 {
        self.movement
    }

    pub fn look(&self) -> DVec2 {
        self.look
    }

    pub fn toggle_mode(&self) -> bool {
        self.toggle_mode
    }

    pub fn set_pitch(&mut self, value: f64) {
        self.pitch = axis("pitch", value);
    }

    pub fn set_roll(&mut self, value: f64) {
        self.roll = axis("roll", value);
    }

    pub fn set_yaw(&mut self, value: f64) {
        self.yaw = axis("yaw", value);
    }

    pub fn set_throttle(&mut self, value: f64) {
        self.throttle = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            warn!("Ignoring non-finite throttle: {}", value);
            self.throttle
        };
        trace!("Throttle: {}", self.throttle);
    }

    /// Set the free-fly movement vector (forward, right, up)
    pub fn set_movement(&mut self, movement: DVec3) {
        self.movement = DVec3::new(
            axis("move_forward", movement.x),
            axis("move_right", movement.y),
            axis("move_up", movement.z),
        );
    }

    /// Accumulate a free-fly look delta
    pub fn add_look_delta(&mut self, dx: f64, dy: f64) {
        if !(dx.is_finite() && dy.is_finite()) {
            warn!("Ignoring non-finite look delta: ({}, {})", dx, dy);
            return;
        }
        self.look += DVec2::new(dx, dy);
        trace!("Look delta: ({}, {})", dx, dy);
    }

    /// Request a switch between free-fly and piloted mode this frame
    pub fn request_mode_toggle(&mut self) {
        self.toggle_mode = true;
    }

    /// Clear per-frame data (look delta and mode toggle)
    ///
    /// Held axes and throttle persist between frames.
    pub fn clear_frame_data(&mut self) {
        self.look = DVec2::ZERO;
        self.toggle_mode = false;
    }
}

impl Default for ControlInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp an axis to [-1, 1]; non-finite values center it
fn axis(name: &str, value: f64) -> f64 {
    if value.is_finite() {
        let clamped = value.clamp(-1.0, 1.0);
        trace!("Axis {}: {}", name, clamped);
        clamped
    } else {
        warn!("Centering non-finite {} axis: {}", name, value);
        0.0
    }
}
