//! Camera projection and view matrices
//!
//! The camera works in render space (Y-up, right-handed, `f32`) relative to
//! the current render origin. Eye position and axes come from the aircraft
//! after they have been rebased into that space.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Largest `z_far / z_near` that keeps a standard 24-bit depth buffer usable
/// across the range
pub const MAX_DEPTH_RATIO: f32 = 1e6;

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Vertical field of view in radians
    pub fov_y_radians: f32,
    /// Aspect ratio (width / height)
    pub aspect_ratio: f32,
    /// Near clipping plane distance
    pub z_near: f32,
    /// Far clipping plane distance
    pub z_far: f32,
}

/// 45 degrees, 4:3, planes at 0.1 m and 100 km
///
/// The planes sit exactly at [`MAX_DEPTH_RATIO`]: close enough for the
/// cockpit view and far enough to see a full rebase radius. A renderer that
/// needs more far-field precision should raise `z_near` or use reversed-Z.
impl Default for Camera {
    fn default() -> Self {
        Self::perspective(45.0, 800.0 / 600.0, 0.1, 100_000.0)
    }
}

impl Camera {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `fov_y_degrees` - Vertical field of view in degrees
    /// * `aspect_ratio` - Width divided by height
    /// * `z_near` - Near clipping plane distance
    /// * `z_far` - Far clipping plane distance
    pub fn perspective(fov_y_degrees: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y_radians: fov_y_degrees.to_radians(),
            aspect_ratio,
            z_near,
            z_far,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_radians,
            self.aspect_ratio,
            self.z_near,
            self.z_far,
        )
    }

    /// World-to-camera matrix for an eye looking along `forward`
    pub fn view_matrix(eye: Vec3, forward: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_to_rh(eye, forward, up)
    }

    /// Combined view-projection matrix
    pub fn view_projection_matrix(&self, eye: Vec3, forward: Vec3, up: Vec3) -> Mat4 {
        self.projection_matrix() * Self::view_matrix(eye, forward, up)
    }

    /// `z_far / z_near`; depth precision falls off as this grows
    pub fn depth_ratio(&self) -> f32 {
        self.z_far / self.z_near
    }

    /// Update the aspect ratio (window resize); non-positive values are ignored
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }
}
