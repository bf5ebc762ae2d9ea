//! East-North-Up local tangent-plane frames
//!
//! ENU is the only frame handed to the single-precision renderer: offsets
//! stay small around the origin, where ECEF magnitudes (~6.4e6 m) would
//! exhaust an `f32` mantissa at sub-meter scale.

use super::geodetic::{geodetic_to_ecef, GeodeticPosition};
use glam::{DMat3, DVec3, Vec3};

/// Local tangent-plane frame anchored at an origin
///
/// The axes are unit vectors expressed in ECEF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnuFrame {
    pub origin_ecef: DVec3,
    pub east: DVec3,
    pub north: DVec3,
    pub up: DVec3,
}

impl EnuFrame {
    /// Frame at the given origin latitude/longitude (radians) and ECEF point
    pub fn new(origin_latitude: f64, origin_longitude: f64, origin_ecef: DVec3) -> Self {
        let (sin_lat, cos_lat) = origin_latitude.sin_cos();
        let (sin_lon, cos_lon) = origin_longitude.sin_cos();

        Self {
            origin_ecef,
            east: DVec3::new(-sin_lon, cos_lon, 0.0),
            north: DVec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
            up: DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
        }
    }

    /// Frame anchored at a geodetic origin
    pub fn at(origin: &GeodeticPosition) -> Self {
        Self::new(origin.latitude(), origin.longitude(), origin.to_ecef())
    }

    /// Rotation taking ECEF vectors into ENU components
    pub fn rotation(&self) -> DMat3 {
        DMat3::from_cols(self.east, self.north, self.up).transpose()
    }

    /// Rotate an ECEF direction into ENU components (no translation)
    pub fn vector_to_enu(&self, v: DVec3) -> DVec3 {
        DVec3::new(v.dot(self.east), v.dot(self.north), v.dot(self.up))
    }

    /// Rotate ENU components back into an ECEF direction (no translation)
    pub fn vector_from_enu(&self, enu: DVec3) -> DVec3 {
        self.east * enu.x + self.north * enu.y + self.up * enu.z
    }

    /// ECEF point to ENU offset from the origin
    pub fn ecef_to_enu(&self, point: DVec3) -> DVec3 {
        self.vector_to_enu(point - self.origin_ecef)
    }

    /// ENU offset back to an ECEF point
    pub fn enu_to_ecef(&self, enu: DVec3) -> DVec3 {
        self.origin_ecef + self.vector_from_enu(enu)
    }
}

/// Express `point` relative to an origin, rotated into the origin's tangent plane
pub fn ecef_to_enu(
    point: DVec3,
    origin_ecef: DVec3,
    origin_latitude: f64,
    origin_longitude: f64,
) -> DVec3 {
    EnuFrame::new(origin_latitude, origin_longitude, origin_ecef).ecef_to_enu(point)
}

/// Geodetic point to ENU offset in one step
pub fn geodetic_to_enu(
    latitude: f64,
    longitude: f64,
    height: f64,
    origin_latitude: f64,
    origin_longitude: f64,
    origin_ecef: DVec3,
) -> DVec3 {
    ecef_to_enu(
        geodetic_to_ecef(latitude, longitude, height),
        origin_ecef,
        origin_latitude,
        origin_longitude,
    )
}

/// Remap an ENU offset to Y-up render space: (x, y, z) = (east, up, -north)
///
/// Only call this on camera-relative offsets; the cast to `f32` is where
/// absolute coordinates would lose precision.
pub fn enu_to_render(enu: DVec3) -> Vec3 {
    Vec3::new(enu.x as f32, enu.z as f32, -enu.y as f32)
}

/// Inverse of [`enu_to_render`]
pub fn render_to_enu(render: Vec3) -> DVec3 {
    DVec3::new(render.x as f64, -render.z as f64, render.y as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_at_equator_prime_meridian() {
        let frame = EnuFrame::new(0.0, 0.0, DVec3::ZERO);
        assert!((frame.east - DVec3::Y).length() < 1e-12);
        assert!((frame.north - DVec3::Z).length() < 1e-12);
        assert!((frame.up - DVec3::X).length() < 1e-12);
    }

    #[test]
    fn test_axes_are_right_handed_and_orthonormal() {
        let frame = EnuFrame::new(0.7, -1.3, DVec3::ZERO);
        assert!((frame.east.length() - 1.0).abs() < 1e-12);
        assert!((frame.north.length() - 1.0).abs() < 1e-12);
        assert!((frame.up.length() - 1.0).abs() < 1e-12);
        assert!(frame.east.dot(frame.north).abs() < 1e-12);
        assert!((frame.east.cross(frame.north) - frame.up).length() < 1e-12);
    }

    #[test]
    fn test_rotation_matches_vector_projection() {
        let frame = EnuFrame::new(0.3, 2.1, DVec3::ZERO);
        let v = DVec3::new(12.0, -4.0, 7.5);
        assert!((frame.rotation() * v - frame.vector_to_enu(v)).length() < 1e-9);
    }

    #[test]
    fn test_enu_roundtrip() {
        let origin = GeodeticPosition::from_degrees(44.0, -73.5, 150.0).unwrap();
        let frame = EnuFrame::at(&origin);
        let enu = DVec3::new(1200.0, -350.0, 40.0);
        let back = frame.ecef_to_enu(frame.enu_to_ecef(enu));
        assert!((back - enu).length() < 1e-6);
    }

    #[test]
    fn test_render_axis_mapping() {
        let render = enu_to_render(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(render, Vec3::new(1.0, 3.0, -2.0));
        assert_eq!(render_to_enu(render), DVec3::new(1.0, 2.0, 3.0));
    }
}
