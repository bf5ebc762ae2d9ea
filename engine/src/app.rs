//! Per-frame scheduling for the flight core
//!
//! One frame runs, strictly in order: clamp `dt`, handle a mode toggle,
//! apply controls, advance the position, repair the frame, rebase the render
//! origin, then build the snapshot handed to the renderer.

use crate::config::{ConfigError, FlightConfig};
use crate::core::aircraft::{Aircraft, Attitude, FlightMode, OrientationFrame};
use crate::core::camera::Camera;
use crate::core::clock::FrameClock;
use crate::core::coordinates::{enu_to_render, GeodeticPosition, RenderOrigin};
use crate::graphics::CameraUniform;
use crate::input::ControlInput;
use glam::{DVec3, Mat4, Vec3};
use tracing::{debug, info, warn};

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot {
    /// Frames simulated so far, including this one
    pub frame_index: u64,
    /// Clamped delta used for this frame (seconds)
    pub dt: f64,
    pub mode: FlightMode,
    pub geodetic: GeodeticPosition,
    pub ecef: DVec3,
    /// Orientation axes in ECEF
    pub orientation: OrientationFrame,
    pub attitude: Attitude,
    /// Speed along forward (m/s)
    pub speed: f64,
    pub throttle: f64,
    /// Aircraft offset from the render origin in ENU (meters, f64)
    pub enu_offset: DVec3,
    /// Same offset in render space (Y-up, f32)
    pub render_offset: Vec3,
    pub render_origin: GeodeticPosition,
    pub view: Mat4,
    pub projection: Mat4,
    pub uniform: CameraUniform,
    /// The render origin moved this frame
    pub rebased: bool,
    /// The orientation frame had drifted and was repaired this frame
    pub frame_repaired: bool,
}

/// Source of per-frame control input (keyboard, joystick, script)
pub trait InputSource {
    fn poll(&mut self) -> ControlInput;
}

/// Consumer of per-frame state (renderer, recorder, logger)
pub trait FrameSink {
    fn present(&mut self, snapshot: &FrameSnapshot);
}

/// Aircraft, render origin, camera and clock driven together
#[derive(Debug)]
pub struct FlightApp {
    aircraft: Aircraft,
    origin: RenderOrigin,
    camera: Camera,
    clock: FrameClock,
    frame_index: u64,
}

impl FlightApp {
    /// Build the flight state described by `config`
    pub fn new(config: &FlightConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let start = config.start_position()?;
        let frame = OrientationFrame::from_heading(
            start.latitude(),
            start.longitude(),
            config.start.heading_deg.to_radians(),
            config.start.pitch_deg.to_radians(),
        );
        let mut aircraft = Aircraft::new(start, frame, config.limits(), config.integration);
        aircraft.set_throttle(config.throttle);
        aircraft.set_mode(config.mode);

        let mut origin = RenderOrigin::new(start, config.rebase_threshold_m);
        origin.set_rebase_enabled(config.rebase_enabled);
        origin.update(&start);

        info!(
            lat_deg = config.start.latitude_deg,
            lon_deg = config.start.longitude_deg,
            height_m = config.start.height_m,
            mode = ?config.mode,
            integration = ?config.integration,
            "Flight core initialized"
        );

        Ok(Self::from_parts(
            aircraft,
            origin,
            config.camera(),
            FrameClock::new(config.max_frame_dt),
        ))
    }

    /// Assemble from already-built parts
    pub fn from_parts(
        aircraft: Aircraft,
        origin: RenderOrigin,
        camera: Camera,
        clock: FrameClock,
    ) -> Self {
        Self {
            aircraft,
            origin,
            camera,
            clock,
            frame_index: 0,
        }
    }

    pub fn aircraft(&self) -> &Aircraft {
        &self.aircraft
    }

    pub fn aircraft_mut(&mut self) -> &mut Aircraft {
        &mut self.aircraft
    }

    pub fn origin(&self) -> &RenderOrigin {
        &self.origin
    }

    pub fn origin_mut(&mut self) -> &mut RenderOrigin {
        &mut self.origin
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Run one frame with an externally measured `dt`
    pub fn frame(&mut self, input: &ControlInput, dt: f64) -> FrameSnapshot {
        let dt = self.clock.clamp(dt);

        if input.toggle_mode() {
            self.aircraft.set_mode(self.aircraft.mode().toggled());
        }

        if let Err(e) = self.aircraft.apply_controls(input, dt) {
            warn!(error = %e, "Control input rejected");
        }
        self.aircraft.update(dt);

        let frame_repaired = self.aircraft.ensure_valid_frame();
        let rebased = self.origin.update(&self.aircraft.position());

        self.frame_index += 1;
        let snapshot = self.build_snapshot(dt, rebased, frame_repaired);

        debug!(
            frame = snapshot.frame_index,
            dt = snapshot.dt,
            lat_deg = snapshot.geodetic.latitude().to_degrees(),
            lon_deg = snapshot.geodetic.longitude().to_degrees(),
            height_m = snapshot.geodetic.height(),
            speed = snapshot.speed,
            "Frame"
        );
        snapshot
    }

    /// Run one frame timed by the internal clock
    pub fn tick(&mut self, input: &ControlInput) -> FrameSnapshot {
        let dt = self.clock.tick();
        self.frame(input, dt)
    }

    /// Current state without advancing
    pub fn snapshot(&self) -> FrameSnapshot {
        self.build_snapshot(0.0, false, false)
    }

    /// Drive `frames` frames at a fixed `dt`, polling `source` and presenting
    /// each snapshot to `sink`
    ///
    /// Returns the last snapshot, or the current state when `frames` is 0.
    pub fn run_frames<I, S>(
        &mut self,
        source: &mut I,
        sink: &mut S,
        frames: u64,
        dt: f64,
    ) -> FrameSnapshot
    where
        I: InputSource + ?Sized,
        S: FrameSink + ?Sized,
    {
        let mut last = self.snapshot();
        for _ in 0..frames {
            let input = source.poll();
            last = self.frame(&input, dt);
            sink.present(&last);
        }
        last
    }

    fn build_snapshot(&self, dt: f64, rebased: bool, frame_repaired: bool) -> FrameSnapshot {
        let aircraft = &self.aircraft;
        let enu_offset = self.origin.offset_of(aircraft.ecef());
        let render_offset = enu_to_render(enu_offset);

        // Axes in the origin's tangent frame, then into render space
        let local = aircraft.frame().to_enu(self.origin.frame());
        let forward = enu_to_render(local.forward()).normalize_or(Vec3::NEG_Z);
        let up = enu_to_render(local.up()).normalize_or(Vec3::Y);

        let view = Camera::view_matrix(render_offset, forward, up);
        let projection = self.camera.projection_matrix();

        FrameSnapshot {
            frame_index: self.frame_index,
            dt,
            mode: aircraft.mode(),
            geodetic: aircraft.position(),
            ecef: aircraft.ecef(),
            orientation: *aircraft.frame(),
            attitude: aircraft.attitude(),
            speed: aircraft.speed(),
            throttle: aircraft.throttle(),
            enu_offset,
            render_offset,
            render_origin: self.origin.origin(),
            view,
            projection,
            uniform: CameraUniform::new(projection * view, render_offset),
            rebased,
            frame_repaired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec2, Vec3Swizzles};

    fn app() -> FlightApp {
        FlightApp::new(&FlightConfig::default()).unwrap()
    }

    #[test]
    fn test_new_places_aircraft_at_start() {
        let app = app();
        let snapshot = app.snapshot();
        let (lat, lon) = snapshot.geodetic.to_degrees();
        assert!((lat - 44.5).abs() < 1e-9);
        assert!((lon + 73.5).abs() < 1e-9);
        assert_eq!(snapshot.mode, FlightMode::Piloted);
        assert_eq!(snapshot.frame_index, 0);

        // Origin sits on the ground directly below
        assert!(snapshot.enu_offset.truncate().length() < 1e-6);
        assert!((snapshot.enu_offset.z - 1500.0).abs() < 1e-6);
        assert!((snapshot.render_offset.y - 1500.0).abs() < 1e-3);
    }

    #[test]
    fn test_frame_clamps_dt() {
        let mut app = app();
        let snapshot = app.frame(&ControlInput::piloted(0.0, 0.0, 0.0, 1.0), 5.0);
        assert_eq!(snapshot.dt, 0.1);
        assert_eq!(app.clock().clamped_frames(), 1);
        // 250 m/s for the clamped 0.1 s
        assert!((snapshot.enu_offset.y - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_toggle_switches_mode_before_controls() {
        let mut app = app();
        let mut input = ControlInput::piloted(0.0, 0.0, 0.0, 1.0);
        input.request_mode_toggle();

        let snapshot = app.frame(&input, 0.05);
        assert_eq!(snapshot.mode, FlightMode::FreeFly);
        assert_eq!(snapshot.speed, 0.0);
        // Controls were applied in free-fly mode, so nothing moved
        assert!((snapshot.enu_offset.z - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn test_free_fly_look_in_frame() {
        let config = FlightConfig {
            mode: FlightMode::FreeFly,
            ..FlightConfig::default()
        };
        let mut app = FlightApp::new(&config).unwrap();
        let input = ControlInput::free_fly(DVec3::ZERO, DVec2::new(900.0, 0.0));
        let snapshot = app.frame(&input, 0.016);

        // 900 × 0.1° = 90° to the right
        assert!((snapshot.attitude.heading - 90f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_view_looks_along_forward() {
        let app = app();
        let snapshot = app.snapshot();

        // Heading north is -Z in render space; a point ahead of the eye
        // ends up in front of the camera
        let ahead = snapshot.render_offset + Vec3::NEG_Z * 100.0;
        let in_view = snapshot.view.transform_point3(ahead);
        assert!(in_view.z < -99.0);
        assert!(in_view.xy().length() < 0.5);

        let clip = snapshot.projection * in_view.extend(1.0);
        assert!(clip.w > 0.0);
        let view_proj = snapshot.projection * snapshot.view;
        assert_eq!(snapshot.uniform.view_proj, view_proj.to_cols_array_2d());
    }

    #[test]
    fn test_frame_index_advances() {
        let mut app = app();
        let input = ControlInput::new();
        app.frame(&input, 0.016);
        let snapshot = app.frame(&input, 0.016);
        assert_eq!(snapshot.frame_index, 2);
        assert_eq!(app.frame_index(), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = FlightConfig {
            throttle: 2.0,
            ..FlightConfig::default()
        };
        assert!(matches!(
            FlightApp::new(&config),
            Err(ConfigError::Invalid(_))
        ));
    }
}
