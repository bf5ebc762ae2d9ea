//! Configuration types for the flight core
//!
//! Configuration is JSON. Every field has a default so a partial file only
//! overrides what it names. Angles are degrees here and converted to radians
//! when the runtime types are built.

use crate::core::aircraft::{FlightLimits, FlightMode, IntegrationStrategy, MeridianModel};
use crate::core::camera::{Camera, MAX_DEPTH_RATIO};
use crate::core::clock::DEFAULT_MAX_DT;
use crate::core::coordinates::{GeodeticError, GeodeticPosition};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Errors that can occur while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid start position: {0}")]
    Geodetic(#[from] GeodeticError),
}

/// Initial aircraft placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartConfig {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// Height above the ellipsoid (meters)
    pub height_m: f64,
    /// Clockwise from north
    pub heading_deg: f64,
    pub pitch_deg: f64,
}

impl Default for StartConfig {
    fn default() -> Self {
        // Over the Adirondacks, inside the N44 W074 terrain tile
        Self {
            latitude_deg: 44.5,
            longitude_deg: -73.5,
            height_m: 1500.0,
            heading_deg: 0.0,
            pitch_deg: 0.0,
        }
    }
}

/// Projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f32,
    pub aspect_ratio: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            fov_y_deg: camera.fov_y_radians.to_degrees(),
            aspect_ratio: camera.aspect_ratio,
            z_near: camera.z_near,
            z_far: camera.z_far,
        }
    }
}

/// Flight core configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub start: StartConfig,
    pub mode: FlightMode,
    /// Initial throttle in [0, 1]
    pub throttle: f64,
    /// Speed at full throttle (m/s)
    pub max_speed: f64,
    pub max_pitch_rate_deg: f64,
    pub max_roll_rate_deg: f64,
    pub max_yaw_rate_deg: f64,
    /// Free-fly speed at full movement input (m/s)
    pub free_fly_speed: f64,
    /// Free-fly degrees of turn per unit of look delta
    pub look_sensitivity_deg: f64,
    pub max_look_pitch_deg: f64,
    pub integration: IntegrationStrategy,
    pub rebase_threshold_m: f64,
    pub rebase_enabled: bool,
    /// Upper bound for a single frame's dt (seconds)
    pub max_frame_dt: f64,
    pub camera: CameraConfig,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
}

impl Default for FlightConfig {
    fn default() -> Self {
        let limits = FlightLimits::default();
        Self {
            start: StartConfig::default(),
            mode: FlightMode::default(),
            throttle: 0.0,
            max_speed: limits.max_speed,
            max_pitch_rate_deg: limits.max_pitch_rate.to_degrees(),
            max_roll_rate_deg: limits.max_roll_rate.to_degrees(),
            max_yaw_rate_deg: limits.max_yaw_rate.to_degrees(),
            free_fly_speed: limits.free_fly_speed,
            look_sensitivity_deg: limits.look_sensitivity.to_degrees(),
            max_look_pitch_deg: limits.max_look_pitch.to_degrees(),
            integration: IntegrationStrategy::default(),
            rebase_threshold_m: 20_000.0,
            rebase_enabled: true,
            max_frame_dt: DEFAULT_MAX_DT,
            camera: CameraConfig::default(),
            log_filter: None,
        }
    }
}

impl FlightConfig {
    /// Load and validate configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = ?path, "Loading flight config");

        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;

        info!(path = ?path, "Flight config loaded");
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(config = ?config, "Parsed flight config");
        Ok(config)
    }

    /// Save this configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = ?path, "Flight config saved");
        Ok(())
    }

    /// Check ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let start = &self.start;
        for (name, value) in [
            ("start.latitude_deg", start.latitude_deg),
            ("start.longitude_deg", start.longitude_deg),
            ("start.height_m", start.height_m),
            ("start.heading_deg", start.heading_deg),
            ("start.pitch_deg", start.pitch_deg),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }
        if !(-90.0..=90.0).contains(&start.latitude_deg) {
            return Err(invalid(format!(
                "start.latitude_deg must be in [-90, 90], got {}",
                start.latitude_deg
            )));
        }
        if !(-90.0 < start.pitch_deg && start.pitch_deg < 90.0) {
            return Err(invalid(format!(
                "start.pitch_deg must be in (-90, 90), got {}",
                start.pitch_deg
            )));
        }
        if !(0.0..=1.0).contains(&self.throttle) {
            return Err(invalid(format!(
                "throttle must be in [0, 1], got {}",
                self.throttle
            )));
        }

        for (name, value) in [
            ("max_speed", self.max_speed),
            ("max_pitch_rate_deg", self.max_pitch_rate_deg),
            ("max_roll_rate_deg", self.max_roll_rate_deg),
            ("max_yaw_rate_deg", self.max_yaw_rate_deg),
            ("free_fly_speed", self.free_fly_speed),
            ("look_sensitivity_deg", self.look_sensitivity_deg),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if !(self.max_look_pitch_deg > 0.0 && self.max_look_pitch_deg < 90.0) {
            return Err(invalid(format!(
                "max_look_pitch_deg must be in (0, 90), got {}",
                self.max_look_pitch_deg
            )));
        }

        if let IntegrationStrategy::LocalLinearized(MeridianModel::FixedMetersPerDegree(m)) =
            self.integration
        {
            if !(m.is_finite() && m > 0.0) {
                return Err(invalid(format!(
                    "fixed_meters_per_degree must be positive, got {m}"
                )));
            }
        }

        if !(self.rebase_threshold_m.is_finite() && self.rebase_threshold_m > 0.0) {
            return Err(invalid(format!(
                "rebase_threshold_m must be positive, got {}",
                self.rebase_threshold_m
            )));
        }
        if !(self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0) {
            return Err(invalid(format!(
                "max_frame_dt must be positive, got {}",
                self.max_frame_dt
            )));
        }

        let camera = &self.camera;
        if !(camera.fov_y_deg > 0.0 && camera.fov_y_deg < 180.0) {
            return Err(invalid(format!(
                "camera.fov_y_deg must be in (0, 180), got {}",
                camera.fov_y_deg
            )));
        }
        if !(camera.aspect_ratio.is_finite() && camera.aspect_ratio > 0.0) {
            return Err(invalid(format!(
                "camera.aspect_ratio must be positive, got {}",
                camera.aspect_ratio
            )));
        }
        if !(camera.z_near > 0.0 && camera.z_far.is_finite() && camera.z_far > camera.z_near) {
            return Err(invalid(format!(
                "camera planes must satisfy 0 < z_near < z_far, got {} and {}",
                camera.z_near, camera.z_far
            )));
        }
        // Usable, but distant geometry will z-fight
        let depth_ratio = camera.z_far / camera.z_near;
        if depth_ratio > MAX_DEPTH_RATIO * 1.001 {
            warn!(
                z_near = camera.z_near,
                z_far = camera.z_far,
                depth_ratio,
                "Camera depth range exceeds 24-bit depth precision"
            );
        }

        Ok(())
    }

    pub fn start_position(&self) -> Result<GeodeticPosition, ConfigError> {
        Ok(GeodeticPosition::from_degrees(
            self.start.latitude_deg,
            self.start.longitude_deg,
            self.start.height_m,
        )?)
    }

    pub fn limits(&self) -> FlightLimits {
        FlightLimits {
            max_speed: self.max_speed,
            max_pitch_rate: self.max_pitch_rate_deg.to_radians(),
            max_roll_rate: self.max_roll_rate_deg.to_radians(),
            max_yaw_rate: self.max_yaw_rate_deg.to_radians(),
            free_fly_speed: self.free_fly_speed,
            look_sensitivity: self.look_sensitivity_deg.to_radians(),
            max_look_pitch: self.max_look_pitch_deg.to_radians(),
        }
    }

    pub fn camera(&self) -> Camera {
        Camera::perspective(
            self.camera.fov_y_deg,
            self.camera.aspect_ratio,
            self.camera.z_near,
            self.camera.z_far,
        )
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}
