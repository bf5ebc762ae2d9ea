//! Position integration strategies
//!
//! Both take an ECEF displacement and return the new geodetic position, or
//! an error if the result fails validation.
//! - [`IntegrationStrategy::EcefLinear`] adds the displacement to the ECEF
//!   position and converts back. Straight-line flight; fine for a local
//!   session, wrong for circumnavigation.
//! - [`IntegrationStrategy::LocalLinearized`] splits the displacement into
//!   east/north/up and turns those into latitude/longitude/height deltas.

use crate::core::coordinates::{
    ecef_to_geodetic, normalize_longitude, EnuFrame, GeodeticError, GeodeticPosition, WGS84,
};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Floor for `cos(lat)` when scaling longitude near the poles
pub const MIN_COS_LATITUDE: f64 = 1e-9;

/// How meters of northing/easting map to degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeridianModel {
    /// Radii of curvature of the ellipsoid at the current latitude and height
    Ellipsoidal,
    /// One fixed length per degree of latitude, scaled by `cos(lat)` for longitude
    FixedMetersPerDegree(f64),
}

/// Strategy used by the aircraft to advance its position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStrategy {
    EcefLinear,
    LocalLinearized(MeridianModel),
}

impl Default for IntegrationStrategy {
    fn default() -> Self {
        Self::LocalLinearized(MeridianModel::Ellipsoidal)
    }
}

impl IntegrationStrategy {
    /// Whether the orientation frame should follow the local vertical as the
    /// position moves
    ///
    /// Local integration follows the surface, so attitude relative to the
    /// horizon is carried along. ECEF integration flies a straight line and
    /// keeps the frame fixed.
    pub fn follows_surface(&self) -> bool {
        matches!(self, Self::LocalLinearized(_))
    }

    /// Advance `position` by `displacement` (meters, ECEF directions)
    pub fn advance(
        &self,
        position: &GeodeticPosition,
        displacement: DVec3,
    ) -> Result<GeodeticPosition, GeodeticError> {
        match self {
            Self::EcefLinear => ecef_to_geodetic(position.to_ecef() + displacement),
            Self::LocalLinearized(model) => advance_local(position, displacement, *model),
        }
    }
}

fn advance_local(
    position: &GeodeticPosition,
    displacement: DVec3,
    model: MeridianModel,
) -> Result<GeodeticPosition, GeodeticError> {
    let local = EnuFrame::new(position.latitude(), position.longitude(), DVec3::ZERO);
    let enu = local.vector_to_enu(displacement);

    let lat = position.latitude();
    let cos_lat = lat.cos().max(MIN_COS_LATITUDE);

    let (d_lat, d_lon) = match model {
        MeridianModel::Ellipsoidal => {
            let m = WGS84.meridional_radius(lat) + position.height();
            let n = WGS84.prime_vertical_radius(lat) + position.height();
            (enu.y / m, enu.x / (n * cos_lat))
        }
        MeridianModel::FixedMetersPerDegree(meters_per_degree) => (
            (enu.y / meters_per_degree).to_radians(),
            (enu.x / (meters_per_degree * cos_lat)).to_radians(),
        ),
    };

    let (latitude, longitude) = wrap_over_pole(lat + d_lat, position.longitude() + d_lon);

    GeodeticPosition::new(latitude, longitude, position.height() + enu.z)
}

/// Fold a latitude that overshot a pole back into range, moving to the
/// opposite meridian
fn wrap_over_pole(latitude: f64, longitude: f64) -> (f64, f64) {
    if latitude > FRAC_PI_2 {
        (PI - latitude, normalize_longitude(longitude + PI))
    } else if latitude < -FRAC_PI_2 {
        (-PI - latitude, normalize_longitude(longitude + PI))
    } else {
        (latitude, normalize_longitude(longitude))
    }
}
