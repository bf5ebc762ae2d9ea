//! Orthonormal forward/up/right orientation frame
//!
//! The axes are unit vectors in ECEF with `right = forward × up`. Rotations
//! follow the right-hand rule about the named axis:
//! - positive pitch (about `right`) raises the nose
//! - positive roll (about `forward`) drops the right wing
//! - positive yaw (about `up`) swings the nose left

use crate::core::coordinates::EnuFrame;
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Axes shorter than this are rejected as degenerate
const MIN_AXIS_LENGTH: f64 = 1e-9;

/// `|forward × up|` below this means the axes are (nearly) parallel
const MIN_AXIS_SEPARATION: f64 = 1e-6;

/// Largest pairwise dot product tolerated before a repair
pub const ORTHOGONALITY_TOLERANCE: f64 = 1e-4;

/// Largest axis length error tolerated before a repair
pub const NORMALIZATION_TOLERANCE: f64 = 1e-5;

/// Errors raised when building or rotating a frame
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("frame axis is not finite: {0:?}")]
    NonFinite(DVec3),

    #[error("frame axis has zero length")]
    ZeroLength,

    #[error("forward and up axes are parallel")]
    Parallel,

    #[error("frame axes are not orthonormal (error {0})")]
    NotOrthonormal(f64),

    #[error("rotation angle is not finite: {0}")]
    NonFiniteAngle(f64),
}

/// Heading/pitch/roll of a frame relative to a local tangent plane (radians)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    /// Clockwise from north, in (-pi, pi]
    pub heading: f64,
    /// Nose above the horizon
    pub pitch: f64,
    /// Right wing down
    pub roll: f64,
}

/// Orthonormal orientation frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrientationFrame {
    forward: DVec3,
    up: DVec3,
    right: DVec3,
}

impl OrientationFrame {
    /// Build a frame from a forward direction and an approximate up
    ///
    /// `up` is re-derived to be exactly perpendicular to `forward`.
    pub fn new(forward: DVec3, up: DVec3) -> Result<Self, FrameError> {
        let forward = checked_unit(forward)?;
        let up = checked_unit(up)?;

        let right = forward.cross(up);
        if right.length() < MIN_AXIS_SEPARATION {
            return Err(FrameError::Parallel);
        }
        let right = right.normalize();
        let up = right.cross(forward).normalize();

        Ok(Self { forward, up, right })
    }

    /// Build a frame from three explicit axes, which must already be orthonormal
    pub fn from_axes(forward: DVec3, up: DVec3, right: DVec3) -> Result<Self, FrameError> {
        for axis in [forward, up, right] {
            if !axis.is_finite() {
                return Err(FrameError::NonFinite(axis));
            }
            if axis.length() < MIN_AXIS_LENGTH {
                return Err(FrameError::ZeroLength);
            }
        }

        let frame = Self { forward, up, right };
        let error = frame.orthonormality_error();
        if error > ORTHOGONALITY_TOLERANCE || (forward.cross(up) - right).length() > 1e-3 {
            return Err(FrameError::NotOrthonormal(error));
        }
        Ok(frame)
    }

    /// Frame with the given heading (clockwise from north) and pitch in the
    /// tangent plane at `latitude`/`longitude`, wings level
    pub fn from_heading(latitude: f64, longitude: f64, heading: f64, pitch: f64) -> Self {
        let enu = EnuFrame::new(latitude, longitude, DVec3::ZERO);
        let (sin_h, cos_h) = heading.sin_cos();
        let (sin_p, cos_p) = pitch.sin_cos();

        let horizontal = enu.north * cos_h + enu.east * sin_h;
        let forward = (horizontal * cos_p + enu.up * sin_p).normalize();
        let up = (enu.up * cos_p - horizontal * sin_p).normalize();
        let right = forward.cross(up).normalize();

        Self { forward, up, right }
    }

    pub fn forward(&self) -> DVec3 {
        self.forward
    }

    pub fn up(&self) -> DVec3 {
        self.up
    }

    pub fn right(&self) -> DVec3 {
        self.right
    }

    /// Rotate `forward` and `up` about `right`
    pub fn pitch(&mut self, angle: f64) -> Result<(), FrameError> {
        let q = rotation(self.right, angle)?;
        self.forward = (q * self.forward).normalize();
        self.up = (q * self.up).normalize();
        Ok(())
    }

    /// Rotate `right` and `up` about `forward`
    pub fn roll(&mut self, angle: f64) -> Result<(), FrameError> {
        let q = rotation(self.forward, angle)?;
        self.right = (q * self.right).normalize();
        self.up = (q * self.up).normalize();
        Ok(())
    }

    /// Rotate `forward` and `right` about `up`
    pub fn yaw(&mut self, angle: f64) -> Result<(), FrameError> {
        let q = rotation(self.up, angle)?;
        self.forward = (q * self.forward).normalize();
        self.right = (q * self.right).normalize();
        Ok(())
    }

    /// Rotate all three axes about an arbitrary unit axis
    pub fn rotate_about(&mut self, axis: DVec3, angle: f64) -> Result<(), FrameError> {
        let axis = checked_unit(axis)?;
        let q = rotation(axis, angle)?;
        self.forward = (q * self.forward).normalize();
        self.up = (q * self.up).normalize();
        self.right = (q * self.right).normalize();
        Ok(())
    }

    /// Largest deviation from orthonormality (axis length error or pairwise dot)
    pub fn orthonormality_error(&self) -> f64 {
        let lengths = [
            (self.forward.length() - 1.0).abs(),
            (self.up.length() - 1.0).abs(),
            (self.right.length() - 1.0).abs(),
        ];
        let dots = [
            self.forward.dot(self.up).abs(),
            self.forward.dot(self.right).abs(),
            self.up.dot(self.right).abs(),
        ];
        lengths.into_iter().chain(dots).fold(0.0, f64::max)
    }

    /// Check lengths within [`NORMALIZATION_TOLERANCE`] and dots within
    /// [`ORTHOGONALITY_TOLERANCE`]
    pub fn is_orthonormal(&self) -> bool {
        let length_ok = [self.forward, self.up, self.right]
            .iter()
            .all(|axis| (axis.length() - 1.0).abs() <= NORMALIZATION_TOLERANCE);
        let dots_ok = self.forward.dot(self.up).abs() <= ORTHOGONALITY_TOLERANCE
            && self.forward.dot(self.right).abs() <= ORTHOGONALITY_TOLERANCE
            && self.up.dot(self.right).abs() <= ORTHOGONALITY_TOLERANCE;
        length_ok && dots_ok
    }

    /// Rebuild the frame around `forward` using cross products
    pub fn reorthonormalize(&mut self) {
        let forward = self.forward.normalize_or_zero();
        let forward = if forward == DVec3::ZERO {
            // forward collapsed entirely; recover it from the other two axes
            self.up.cross(self.right).normalize_or(DVec3::X)
        } else {
            forward
        };

        let mut right = forward.cross(self.up);
        if right.length() < MIN_AXIS_SEPARATION {
            // up collapsed onto forward; trust right instead
            let up = self.right.cross(forward);
            right = if up.length() < MIN_AXIS_SEPARATION {
                forward.any_orthonormal_vector()
            } else {
                forward.cross(up.normalize())
            };
        }
        let right = right.normalize();

        self.forward = forward;
        self.right = right;
        self.up = right.cross(forward).normalize();
    }

    /// Remove roll: make `up` the component of `local_up` perpendicular to `forward`
    ///
    /// When looking straight along `local_up` the current `right` is kept.
    pub fn level(&mut self, local_up: DVec3) {
        let right = self.forward.cross(local_up);
        if right.length() < MIN_AXIS_SEPARATION {
            self.reorthonormalize();
            return;
        }
        self.right = right.normalize();
        self.up = self.right.cross(self.forward).normalize();
    }

    /// Heading, pitch and roll in the given tangent frame
    pub fn attitude(&self, enu: &EnuFrame) -> Attitude {
        let f = enu.vector_to_enu(self.forward);
        let heading = f.x.atan2(f.y);
        let pitch = f.z.clamp(-1.0, 1.0).asin();
        let roll = (-self.right.dot(enu.up)).atan2(self.up.dot(enu.up));
        Attitude {
            heading,
            pitch,
            roll,
        }
    }

    /// Rotate all axes from ECEF into the given tangent frame
    pub fn to_enu(&self, enu: &EnuFrame) -> Self {
        Self {
            forward: enu.vector_to_enu(self.forward),
            up: enu.vector_to_enu(self.up),
            right: enu.vector_to_enu(self.right),
        }
    }
}

fn checked_unit(v: DVec3) -> Result<DVec3, FrameError> {
    if !v.is_finite() {
        return Err(FrameError::NonFinite(v));
    }
    let length = v.length();
    if length < MIN_AXIS_LENGTH {
        return Err(FrameError::ZeroLength);
    }
    Ok(v / length)
}

fn rotation(axis: DVec3, angle: f64) -> Result<DQuat, FrameError> {
    if !angle.is_finite() {
        return Err(FrameError::NonFiniteAngle(angle));
    }
    Ok(DQuat::from_axis_angle(axis.normalize(), angle))
}
