//! Aircraft/camera state machine
//!
//! Geodetic position is the source of truth; ECEF is cached alongside it and
//! both are only ever replaced together. The orientation frame lives in ECEF.
//!
//! Two modes:
//! - [`FlightMode::Piloted`]: `update` advances along `forward` at
//!   `throttle × max_speed`; stick and pedal axes apply bounded rotations.
//! - [`FlightMode::FreeFly`]: no throttle motion; the camera moves by the
//!   raw movement vector and turns by the raw look delta, staying roll-free.

pub mod frame;
pub mod integrator;

pub use frame::{Attitude, FrameError, OrientationFrame};
pub use integrator::{IntegrationStrategy, MeridianModel};

use crate::core::coordinates::{EnuFrame, GeodeticPosition};
use crate::input::ControlInput;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Operating mode of the aircraft/camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightMode {
    FreeFly,
    #[default]
    Piloted,
}

impl FlightMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::FreeFly => Self::Piloted,
            Self::Piloted => Self::FreeFly,
        }
    }
}

/// Speeds and rates that bound the per-tick change of state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightLimits {
    /// Speed at full throttle (m/s)
    pub max_speed: f64,
    /// Pitch rate at full stick deflection (rad/s)
    pub max_pitch_rate: f64,
    /// Roll rate at full stick deflection (rad/s)
    pub max_roll_rate: f64,
    /// Yaw rate at full pedal deflection (rad/s)
    pub max_yaw_rate: f64,
    /// Free-fly speed at full movement input (m/s)
    pub free_fly_speed: f64,
    /// Free-fly turn per unit of look delta (rad)
    pub look_sensitivity: f64,
    /// Free-fly pitch limit above/below the horizon (rad)
    pub max_look_pitch: f64,
}

impl Default for FlightLimits {
    fn default() -> Self {
        Self {
            max_speed: 250.0,
            max_pitch_rate: 45f64.to_radians(),
            max_roll_rate: 90f64.to_radians(),
            max_yaw_rate: 30f64.to_radians(),
            free_fly_speed: 50.0,
            look_sensitivity: 0.1f64.to_radians(),
            max_look_pitch: 89f64.to_radians(),
        }
    }
}

/// Aircraft/camera state
#[derive(Debug, Clone)]
pub struct Aircraft {
    position: GeodeticPosition,
    ecef: DVec3,
    frame: OrientationFrame,
    throttle: f64,
    limits: FlightLimits,
    mode: FlightMode,
    strategy: IntegrationStrategy,
}

impl Aircraft {
    /// Create an aircraft in piloted mode with idle throttle
    pub fn new(
        position: GeodeticPosition,
        frame: OrientationFrame,
        limits: FlightLimits,
        strategy: IntegrationStrategy,
    ) -> Self {
        Self {
            position,
            ecef: position.to_ecef(),
            frame,
            throttle: 0.0,
            limits,
            mode: FlightMode::Piloted,
            strategy,
        }
    }

    /// Create an aircraft with wings level at the given heading (radians,
    /// clockwise from north)
    pub fn with_heading(
        position: GeodeticPosition,
        heading: f64,
        limits: FlightLimits,
        strategy: IntegrationStrategy,
    ) -> Self {
        let frame = OrientationFrame::from_heading(position.latitude(), position.longitude(), heading, 0.0);
        Self::new(position, frame, limits, strategy)
    }

    pub fn position(&self) -> GeodeticPosition {
        self.position
    }

    pub fn ecef(&self) -> DVec3 {
        self.ecef
    }

    pub fn frame(&self) -> &OrientationFrame {
        &self.frame
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn limits(&self) -> &FlightLimits {
        &self.limits
    }

    pub fn mode(&self) -> FlightMode {
        self.mode
    }

    pub fn strategy(&self) -> IntegrationStrategy {
        self.strategy
    }

    /// Current speed along `forward` (m/s); zero in free-fly mode
    pub fn speed(&self) -> f64 {
        match self.mode {
            FlightMode::Piloted => self.throttle * self.limits.max_speed,
            FlightMode::FreeFly => 0.0,
        }
    }

    /// Tangent frame at the current position
    pub fn local_frame(&self) -> EnuFrame {
        EnuFrame::new(self.position.latitude(), self.position.longitude(), self.ecef)
    }

    /// Heading/pitch/roll relative to the local horizon
    pub fn attitude(&self) -> Attitude {
        self.frame.attitude(&self.local_frame())
    }

    /// Set throttle, clamped to [0, 1]; non-finite values are ignored
    pub fn set_throttle(&mut self, throttle: f64) {
        if throttle.is_finite() {
            self.throttle = throttle.clamp(0.0, 1.0);
        } else {
            warn!("Ignoring non-finite throttle: {}", throttle);
        }
    }

    /// Teleport; the cached ECEF position follows
    pub fn set_position(&mut self, position: GeodeticPosition) {
        self.position = position;
        self.ecef = position.to_ecef();
    }

    pub fn set_frame(&mut self, frame: OrientationFrame) {
        self.frame = frame;
    }

    pub fn set_strategy(&mut self, strategy: IntegrationStrategy) {
        self.strategy = strategy;
    }

    /// Switch mode; entering free-fly levels the frame against the local vertical
    pub fn set_mode(&mut self, mode: FlightMode) {
        if mode == self.mode {
            return;
        }
        if mode == FlightMode::FreeFly {
            self.frame.level(self.local_frame().up);
        }
        info!(from = ?self.mode, to = ?mode, "Flight mode changed");
        self.mode = mode;
    }

    pub fn pitch(&mut self, angle: f64) -> Result<(), FrameError> {
        self.frame.pitch(angle)
    }

    pub fn roll(&mut self, angle: f64) -> Result<(), FrameError> {
        self.frame.roll(angle)
    }

    pub fn yaw(&mut self, angle: f64) -> Result<(), FrameError> {
        self.frame.yaw(angle)
    }

    /// Advance along `forward` by `speed × dt`
    ///
    /// `dt <= 0` or non-finite is a no-op.
    pub fn update(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let distance = self.speed() * dt;
        if distance == 0.0 {
            return;
        }
        self.translate(self.frame.forward() * distance);
    }

    /// Move by an ECEF displacement using the configured strategy
    ///
    /// A result that fails validation is dropped and the state kept.
    pub fn translate(&mut self, displacement: DVec3) {
        if !displacement.is_finite() {
            warn!("Ignoring non-finite displacement: {:?}", displacement);
            return;
        }

        let next = match self.strategy.advance(&self.position, displacement) {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, "Rejected integrated position");
                return;
            }
        };

        if self.strategy.follows_surface() {
            self.carry_frame(next);
        }
        self.set_position(next);
    }

    /// Apply one frame of control input
    ///
    /// Piloted rotations are `axis × max_rate × dt`. Free-fly look deltas are
    /// per-frame already and are not scaled by `dt`.
    pub fn apply_controls(&mut self, input: &ControlInput, dt: f64) -> Result<(), FrameError> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        match self.mode {
            FlightMode::Piloted => {
                self.set_throttle(input.throttle());
                self.frame.pitch(input.pitch() * self.limits.max_pitch_rate * dt)?;
                self.frame.roll(input.roll() * self.limits.max_roll_rate * dt)?;
                // Right pedal turns the nose right, a negative frame yaw
                self.frame.yaw(-input.yaw() * self.limits.max_yaw_rate * dt)?;
            }
            FlightMode::FreeFly => {
                self.look(input.look().x, input.look().y)?;

                let movement = input.movement();
                if movement != DVec3::ZERO && dt > 0.0 {
                    let local_up = self.local_frame().up;
                    let direction = self.frame.forward() * movement.x
                        + self.frame.right() * movement.y
                        + local_up * movement.z;
                    self.translate(direction * self.limits.free_fly_speed * dt);
                }
            }
        }
        Ok(())
    }

    /// Free-fly look: turn right by `dx` and up by `dy` device units
    fn look(&mut self, dx: f64, dy: f64) -> Result<(), FrameError> {
        if dx == 0.0 && dy == 0.0 {
            return Ok(());
        }
        let local_up = self.local_frame().up;
        let sensitivity = self.limits.look_sensitivity;

        // Turning right is a negative rotation about the vertical
        self.frame.rotate_about(local_up, -dx * sensitivity)?;

        let limit = self.limits.max_look_pitch;
        let current = self.frame.forward().dot(local_up).clamp(-1.0, 1.0).asin();
        let target = (current + dy * sensitivity).clamp(-limit, limit);
        self.frame.pitch(target - current)?;

        self.frame.level(local_up);
        Ok(())
    }

    /// Rotate the frame with the local vertical when moving to `next`
    fn carry_frame(&mut self, next: GeodeticPosition) {
        let old_up = self.local_frame().up;
        let new_up = EnuFrame::new(next.latitude(), next.longitude(), DVec3::ZERO).up;

        let (axis, angle) = glam::DQuat::from_rotation_arc(old_up, new_up).to_axis_angle();
        if angle.abs() < 1e-15 {
            return;
        }
        if let Err(e) = self.frame.rotate_about(axis, angle) {
            warn!(error = %e, "Could not carry frame to new position");
        }
    }

    /// Repair the frame if it drifted from orthonormal
    ///
    /// Returns true if a repair was needed.
    pub fn ensure_valid_frame(&mut self) -> bool {
        if self.frame.is_orthonormal() {
            return false;
        }
        warn!(
            error = self.frame.orthonormality_error(),
            "Orientation frame drifted, re-orthonormalizing"
        );
        self.frame.reorthonormalize();
        debug!(frame = ?self.frame, "Repaired orientation frame");
        true
    }
}
