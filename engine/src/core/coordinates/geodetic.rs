//! Geodetic positions and the geodetic <-> ECEF conversions
//!
//! Latitude and longitude are stored in radians, height in meters above the
//! WGS84 ellipsoid. Degrees only enter through [`GeodeticPosition::from_degrees`].

use super::ellipsoid::WGS84;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Maximum refinement passes in [`ecef_to_geodetic`]
const MAX_LATITUDE_ITERATIONS: usize = 5;

/// Latitude change below which the refinement stops (radians)
const LATITUDE_TOLERANCE: f64 = 1e-12;

/// Errors raised when constructing a geodetic position
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeodeticError {
    #[error("non-finite geodetic component: lat={latitude}, lon={longitude}, h={height}")]
    NonFinite {
        latitude: f64,
        longitude: f64,
        height: f64,
    },

    #[error("latitude {0} rad is outside [-pi/2, pi/2]")]
    LatitudeOutOfRange(f64),

    #[error("non-finite ECEF position: {0}")]
    NonFiniteEcef(DVec3),
}

/// Position on or above the WGS84 ellipsoid
///
/// Only obtainable through [`GeodeticPosition::new`] and the conversions
/// built on it, so every value is finite with latitude in range.
/// Deserialization goes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeodetic")]
pub struct GeodeticPosition {
    /// Latitude in radians, within [-pi/2, pi/2]
    latitude: f64,
    /// Longitude in radians, within (-pi, pi]
    longitude: f64,
    /// Height above the ellipsoid in meters
    height: f64,
}

/// Unchecked wire form of [`GeodeticPosition`]
#[derive(Deserialize)]
struct RawGeodetic {
    latitude: f64,
    longitude: f64,
    height: f64,
}

impl TryFrom<RawGeodetic> for GeodeticPosition {
    type Error = GeodeticError;

    fn try_from(raw: RawGeodetic) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude, raw.height)
    }
}

impl GeodeticPosition {
    /// Create a validated position from radians and meters
    ///
    /// Longitude is normalized into (-pi, pi].
    pub fn new(latitude: f64, longitude: f64, height: f64) -> Result<Self, GeodeticError> {
        if !(latitude.is_finite() && longitude.is_finite() && height.is_finite()) {
            return Err(GeodeticError::NonFinite {
                latitude,
                longitude,
                height,
            });
        }
        if !(-FRAC_PI_2..=FRAC_PI_2).contains(&latitude) {
            return Err(GeodeticError::LatitudeOutOfRange(latitude));
        }
        Ok(Self {
            latitude,
            longitude: normalize_longitude(longitude),
            height,
        })
    }

    /// Create a validated position from degrees and meters
    pub fn from_degrees(
        latitude_deg: f64,
        longitude_deg: f64,
        height: f64,
    ) -> Result<Self, GeodeticError> {
        Self::new(latitude_deg.to_radians(), longitude_deg.to_radians(), height)
    }

    /// Latitude in radians
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in radians
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Height above the ellipsoid in meters
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Latitude and longitude in degrees
    pub fn to_degrees(&self) -> (f64, f64) {
        (self.latitude.to_degrees(), self.longitude.to_degrees())
    }

    /// ECEF position of this point
    pub fn to_ecef(&self) -> DVec3 {
        geodetic_to_ecef(self.latitude, self.longitude, self.height)
    }

    /// The same latitude/longitude on the ellipsoid surface
    pub fn ground_point(&self) -> Self {
        Self {
            height: 0.0,
            ..*self
        }
    }
}

/// Wrap a longitude into (-pi, pi]
pub fn normalize_longitude(longitude: f64) -> f64 {
    let wrapped = longitude.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Geodetic (radians, meters) to ECEF (meters)
pub fn geodetic_to_ecef(latitude: f64, longitude: f64, height: f64) -> DVec3 {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();

    let n = WGS84.prime_vertical_radius(latitude);

    DVec3::new(
        (n + height) * cos_lat * cos_lon,
        (n + height) * cos_lat * sin_lon,
        ((1.0 - WGS84.e2) * n + height) * sin_lat,
    )
}

/// ECEF (meters) to geodetic
///
/// Seeds latitude with Bowring's estimate and refines it until it moves by
/// less than 1e-12 rad, for at most five passes. Longitude is 0 on the polar
/// axis, where it is undefined. Non-finite input is rejected.
pub fn ecef_to_geodetic(ecef: DVec3) -> Result<GeodeticPosition, GeodeticError> {
    if !ecef.is_finite() {
        return Err(GeodeticError::NonFiniteEcef(ecef));
    }

    let p = ecef.x.hypot(ecef.y);
    let z = ecef.z;

    if p < f64::EPSILON * WGS84.a {
        // On the polar axis
        let latitude = if z > 0.0 {
            FRAC_PI_2
        } else if z < 0.0 {
            -FRAC_PI_2
        } else {
            0.0
        };
        let height = if z == 0.0 { -WGS84.a } else { z.abs() - WGS84.b };
        return GeodeticPosition::new(latitude, 0.0, height);
    }

    let longitude = ecef.y.atan2(ecef.x);

    let ep2 = WGS84.e2 / (1.0 - WGS84.e2);
    let theta = (z * WGS84.a).atan2(p * WGS84.b);
    let (sin_t, cos_t) = theta.sin_cos();
    let mut latitude = (z + ep2 * WGS84.b * sin_t.powi(3))
        .atan2(p - WGS84.e2 * WGS84.a * cos_t.powi(3));

    for _ in 0..MAX_LATITUDE_ITERATIONS {
        let n = WGS84.prime_vertical_radius(latitude);
        let next = (z + WGS84.e2 * n * latitude.sin()).atan2(p);
        let delta = (next - latitude).abs();
        latitude = next;
        if delta < LATITUDE_TOLERANCE {
            break;
        }
    }

    // Stable at every latitude, unlike p / cos(lat) - N
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let height = p * cos_lat + z * sin_lat
        - WGS84.a * (1.0 - WGS84.e2 * sin_lat * sin_lat).sqrt();

    GeodeticPosition::new(latitude, longitude, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_finite() {
        assert!(matches!(
            GeodeticPosition::new(f64::NAN, 0.0, 0.0),
            Err(GeodeticError::NonFinite { .. })
        ));
        assert!(GeodeticPosition::new(0.0, f64::INFINITY, 0.0).is_err());
        assert!(GeodeticPosition::new(0.0, 0.0, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_new_rejects_latitude_out_of_range() {
        assert_eq!(
            GeodeticPosition::new(2.0, 0.0, 0.0),
            Err(GeodeticError::LatitudeOutOfRange(2.0))
        );
        assert!(GeodeticPosition::new(FRAC_PI_2, 0.0, 0.0).is_ok());
        assert!(GeodeticPosition::new(-FRAC_PI_2, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_longitude_normalization() {
        assert!((normalize_longitude(2.5 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!((normalize_longitude(-PI) - PI).abs() < 1e-12);
        assert!((normalize_longitude(1.5 * PI) + 0.5 * PI).abs() < 1e-12);
        assert_eq!(normalize_longitude(0.25), 0.25);

        let pos = GeodeticPosition::from_degrees(10.0, 190.0, 0.0).unwrap();
        assert!((pos.longitude().to_degrees() + 170.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_degrees_roundtrip() {
        let pos = GeodeticPosition::from_degrees(44.5, -73.25, 120.0).unwrap();
        let (lat, lon) = pos.to_degrees();
        assert!((lat - 44.5).abs() < 1e-12);
        assert!((lon + 73.25).abs() < 1e-12);
        assert_eq!(pos.height(), 120.0);
    }

    #[test]
    fn test_geodetic_to_ecef_equator() {
        let ecef = geodetic_to_ecef(0.0, 0.0, 0.0);
        assert!((ecef - DVec3::new(WGS84.a, 0.0, 0.0)).length() < 1e-6);

        let ecef = geodetic_to_ecef(0.0, FRAC_PI_2, 1000.0);
        assert!((ecef - DVec3::new(0.0, WGS84.a + 1000.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_geodetic_to_ecef_pole() {
        let ecef = geodetic_to_ecef(FRAC_PI_2, 0.0, 0.0);
        assert!(ecef.x.abs() < 1e-6);
        assert!((ecef.z - WGS84.b).abs() < 1e-6);
    }

    #[test]
    fn test_ecef_to_geodetic_on_polar_axis() {
        let north = ecef_to_geodetic(DVec3::new(0.0, 0.0, WGS84.b + 500.0)).unwrap();
        assert_eq!(north.latitude(), FRAC_PI_2);
        assert_eq!(north.longitude(), 0.0);
        assert!((north.height() - 500.0).abs() < 1e-6);

        let south = ecef_to_geodetic(DVec3::new(0.0, 0.0, -WGS84.b)).unwrap();
        assert_eq!(south.latitude(), -FRAC_PI_2);
        assert!(south.height().abs() < 1e-6);
    }

    #[test]
    fn test_ecef_to_geodetic_near_pole_height_is_stable() {
        let pos = GeodeticPosition::new(FRAC_PI_2 - 1e-10, 1.0, 250.0).unwrap();
        let back = ecef_to_geodetic(pos.to_ecef()).unwrap();
        assert!((back.height() - 250.0).abs() < 1e-6);
        assert!((back.latitude() - pos.latitude()).abs() < 1e-9);
    }

    #[test]
    fn test_ground_point() {
        let pos = GeodeticPosition::from_degrees(10.0, 20.0, 3000.0).unwrap();
        let ground = pos.ground_point();
        assert_eq!(ground.height(), 0.0);
        assert_eq!(ground.latitude(), pos.latitude());
        assert_eq!(ground.longitude(), pos.longitude());
    }

    #[test]
    fn test_ecef_to_geodetic_rejects_non_finite() {
        assert!(matches!(
            ecef_to_geodetic(DVec3::new(f64::NAN, 0.0, 0.0)),
            Err(GeodeticError::NonFiniteEcef(_))
        ));
        assert!(ecef_to_geodetic(DVec3::new(WGS84.a, f64::INFINITY, 0.0)).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let pos: GeodeticPosition =
            serde_json::from_str(r#"{"latitude":0.5,"longitude":3.5,"height":10.0}"#).unwrap();
        assert_eq!(pos.latitude(), 0.5);
        assert!((pos.longitude() - (3.5 - TAU)).abs() < 1e-12);

        let out_of_range =
            serde_json::from_str::<GeodeticPosition>(r#"{"latitude":7.0,"longitude":0.0,"height":0.0}"#);
        assert!(out_of_range.is_err());

        // Serialized form reads back unchanged
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(serde_json::from_str::<GeodeticPosition>(&json).unwrap(), pos);
    }
}
