//! Flight core for a terrain flyover viewer
//!
//! This crate provides WGS84 geodetic transforms (geodetic, ECEF, ENU and a
//! rebasing render origin), an aircraft/camera state machine with piloted
//! and free-fly modes, and the per-frame loop that hands camera-relative
//! matrices to a renderer.

pub mod app;
pub mod config;
pub mod core;
pub mod graphics;
pub mod input;

// Re-export commonly used types
pub mod prelude {
    // Geodesy
    pub use crate::core::coordinates::{
        ecef_to_enu, ecef_to_geodetic, enu_to_render, geodetic_to_ecef, geodetic_to_enu,
        EnuFrame, GeodeticError, GeodeticPosition, RenderOrigin, WGS84,
    };

    // Aircraft types
    pub use crate::core::aircraft::{
        Aircraft, Attitude, FlightLimits, FlightMode, FrameError, IntegrationStrategy,
        MeridianModel, OrientationFrame,
    };

    // Camera and timing
    pub use crate::core::camera::Camera;
    pub use crate::core::clock::FrameClock;
    pub use crate::graphics::CameraUniform;

    // Input types
    pub use crate::input::ControlInput;

    // Config types
    pub use crate::config::{ConfigError, FlightConfig};

    // App types
    pub use crate::app::{FlightApp, FrameSink, FrameSnapshot, InputSource};

    // Math types
    pub use glam::{DVec2, DVec3, Mat4, Vec3};
}

/// Initialize logging
///
/// `RUST_LOG` wins when set; otherwise `filter` is used, falling back to
/// `info`. Returns false if a global subscriber was already installed.
pub fn init_logging(filter: Option<&str>) -> bool {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.unwrap_or("info").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
