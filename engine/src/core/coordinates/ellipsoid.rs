//! Reference ellipsoid model
//!
//! All quantities are in meters and radians.

/// Reference ellipsoid parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
    /// Semi-minor axis: a * (1 - f)
    pub b: f64,
    /// First eccentricity squared: (a² - b²) / a²
    pub e2: f64,
}

/// WGS84 reference ellipsoid
pub const WGS84: Ellipsoid = Ellipsoid::new(6_378_137.0, 1.0 / 298.257_223_563);

/// Meters per degree of latitude used by the early viewer prototypes.
///
/// Only exact near the equator; kept for reproducing legacy flight paths.
pub const LEGACY_METERS_PER_DEGREE: f64 = 111_320.0;

impl Ellipsoid {
    /// Create an ellipsoid from its semi-major axis and flattening
    pub const fn new(a: f64, f: f64) -> Self {
        let b = a * (1.0 - f);
        let e2 = (a * a - b * b) / (a * a);
        Self { a, f, b, e2 }
    }

    /// Prime-vertical radius of curvature N(lat)
    pub fn prime_vertical_radius(&self, latitude: f64) -> f64 {
        let s = latitude.sin();
        self.a / (1.0 - self.e2 * s * s).sqrt()
    }

    /// Meridional radius of curvature M(lat)
    pub fn meridional_radius(&self, latitude: f64) -> f64 {
        let s = latitude.sin();
        let w2 = 1.0 - self.e2 * s * s;
        self.a * (1.0 - self.e2) / (w2 * w2.sqrt())
    }

    /// Length of one degree of latitude at the given latitude and height
    pub fn meters_per_degree_latitude(&self, latitude: f64, height: f64) -> f64 {
        (self.meridional_radius(latitude) + height).to_radians()
    }

    /// Length of one degree of longitude at the given latitude and height
    ///
    /// Goes to zero at the poles; callers dividing by it must guard.
    pub fn meters_per_degree_longitude(&self, latitude: f64, height: f64) -> f64 {
        ((self.prime_vertical_radius(latitude) + height) * latitude.cos()).to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_constants() {
        assert_eq!(WGS84.a, 6_378_137.0);
        assert!((WGS84.b - 6_356_752.314_245_179).abs() < 1e-3);
        assert!((WGS84.e2 - 0.006_694_379_990_14).abs() < 1e-12);
    }

    #[test]
    fn test_eccentricity_matches_axes() {
        let from_axes = (WGS84.a * WGS84.a - WGS84.b * WGS84.b) / (WGS84.a * WGS84.a);
        let from_flattening = 2.0 * WGS84.f - WGS84.f * WGS84.f;
        assert!((from_axes - WGS84.e2).abs() < 1e-14);
        assert!((from_flattening - WGS84.e2).abs() < 1e-14);
    }

    #[test]
    fn test_radii_at_equator_and_pole() {
        // N = a and M = a(1 - e²) at the equator
        assert!((WGS84.prime_vertical_radius(0.0) - WGS84.a).abs() < 1e-6);
        assert!((WGS84.meridional_radius(0.0) - WGS84.a * (1.0 - WGS84.e2)).abs() < 1e-6);

        // Both radii meet at a²/b at the pole
        let polar = WGS84.a * WGS84.a / WGS84.b;
        let half_pi = std::f64::consts::FRAC_PI_2;
        assert!((WGS84.prime_vertical_radius(half_pi) - polar).abs() < 1e-3);
        assert!((WGS84.meridional_radius(half_pi) - polar).abs() < 1e-3);
    }

    #[test]
    fn test_meters_per_degree_near_legacy_constant() {
        // The legacy constant sits between the equatorial and polar values
        let equator = WGS84.meters_per_degree_latitude(0.0, 0.0);
        let pole = WGS84.meters_per_degree_latitude(std::f64::consts::FRAC_PI_2, 0.0);
        assert!(equator < LEGACY_METERS_PER_DEGREE);
        assert!(pole > LEGACY_METERS_PER_DEGREE);
        assert!((equator - 110_574.0).abs() < 1.0);
    }

    #[test]
    fn test_meters_per_degree_longitude_vanishes_at_pole() {
        let equator = WGS84.meters_per_degree_longitude(0.0, 0.0);
        assert!((equator - 111_319.49).abs() < 0.1);
        assert!(WGS84.meters_per_degree_longitude(std::f64::consts::FRAC_PI_2, 0.0) < 1e-6);
    }
}
