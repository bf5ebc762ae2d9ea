//! Geodetic coordinate pipeline
//!
//! Converts between geodetic (lat/lon/height), Earth-Centered-Earth-Fixed
//! and East-North-Up frames on the WGS84 ellipsoid:
//! - f64 geodetic/ECEF positions as the source of truth
//! - small f32 ENU offsets around a rebasing origin for GPU rendering
//!
//! Angles are radians and distances meters throughout.

pub mod ellipsoid;
pub mod enu;
pub mod geodetic;
pub mod origin_manager;


pub use ellipsoid::{Ellipsoid, LEGACY_METERS_PER_DEGREE, WGS84};
pub use enu::{ecef_to_enu, enu_to_render, geodetic_to_enu, render_to_enu, EnuFrame};
pub use geodetic::{
    ecef_to_geodetic, geodetic_to_ecef, normalize_longitude, GeodeticError, GeodeticPosition,
};
pub use origin_manager::{Rebase, RenderOrigin, RenderOriginStats};
