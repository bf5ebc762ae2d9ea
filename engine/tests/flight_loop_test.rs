//! Frame loop integration tests: rebasing over long flights, dt clamping,
//! mode switching and frame stability

use flyover_engine::prelude::*;
use tracing::info;

struct Constant(ControlInput);

impl InputSource for Constant {
    fn poll(&mut self) -> ControlInput {
        self.0
    }
}

/// Holds `input`, requesting a mode toggle on the listed frames
struct ToggleAt {
    frame: u64,
    toggles: Vec<u64>,
    input: ControlInput,
}

impl InputSource for ToggleAt {
    fn poll(&mut self) -> ControlInput {
        let mut input = self.input;
        if self.toggles.contains(&self.frame) {
            input.request_mode_toggle();
        }
        self.frame += 1;
        input
    }
}

#[derive(Default)]
struct Recorder(Vec<FrameSnapshot>);

impl FrameSink for Recorder {
    fn present(&mut self, snapshot: &FrameSnapshot) {
        self.0.push(*snapshot);
    }
}

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

fn eastbound_config() -> FlightConfig {
    let mut config = FlightConfig::default();
    config.start.heading_deg = 90.0;
    config.throttle = 1.0;
    config
}

#[test]
fn test_long_flight_rebases_and_keeps_offsets_small() {
    init_test_logging();

    let config = eastbound_config();
    let mut app = FlightApp::new(&config).unwrap();
    let mut source = Constant(ControlInput::piloted(0.0, 0.0, 0.0, 1.0));
    let mut sink = Recorder::default();

    // 250 m/s for 300 s
    app.run_frames(&mut source, &mut sink, 3000, 0.1);
    let frames = sink.0;

    let rebases = frames.iter().filter(|s| s.rebased).count();
    info!(rebases, "Long flight finished");
    assert_eq!(rebases, 3);
    assert_eq!(app.origin().stats().rebases_performed, 3);

    for snapshot in &frames {
        let offset = snapshot.enu_offset;
        assert!(offset.truncate().length() <= config.rebase_threshold_m + 1.0);

        // Single precision keeps centimeters at these distances
        let render = snapshot.render_offset;
        assert!((render.x as f64 - offset.x).abs() < 0.01);
        assert!((render.y as f64 - offset.z).abs() < 0.01);
        assert!((render.z as f64 + offset.y).abs() < 0.01);

        if snapshot.rebased {
            // New origin sits on the ground below the aircraft
            assert!(offset.truncate().length() < 1e-3);
            assert!((offset.z - snapshot.geodetic.height()).abs() < 1e-3);
        }
    }

    let last = frames.last().unwrap();
    assert!((last.geodetic.height() - 1500.0).abs() < 0.01);
    assert!(last.geodetic.longitude().to_degrees() > -73.5 + 0.9);
}

#[test]
fn test_disabled_rebasing_lets_offset_grow() {
    let mut config = eastbound_config();
    config.rebase_enabled = false;
    let mut app = FlightApp::new(&config).unwrap();
    let mut source = Constant(ControlInput::piloted(0.0, 0.0, 0.0, 1.0));
    let mut sink = Recorder::default();

    let last = app.run_frames(&mut source, &mut sink, 1000, 0.1);
    assert!(sink.0.iter().all(|s| !s.rebased));
    assert!(last.enu_offset.truncate().length() > 24_000.0);
}

#[test]
fn test_hovering_high_does_not_rebase() {
    let mut config = FlightConfig::default();
    config.start.height_m = 30_000.0;
    config.mode = FlightMode::FreeFly;
    let mut app = FlightApp::new(&config).unwrap();
    let mut source = Constant(ControlInput::default());
    let mut sink = Recorder::default();

    let last = app.run_frames(&mut source, &mut sink, 10, 0.1);
    assert!(sink.0.iter().all(|s| !s.rebased));
    assert_eq!(app.origin().stats().rebases_performed, 0);
    assert!((last.enu_offset.z - 30_000.0).abs() < 1e-3);
}

#[test]
fn test_stalled_frames_are_clamped() {
    let mut app = FlightApp::new(&eastbound_config()).unwrap();
    let input = ControlInput::piloted(0.0, 0.0, 0.0, 1.0);

    let before = app.snapshot();
    let snapshot = app.frame(&input, 10.0);
    assert_eq!(snapshot.dt, 0.1);

    let moved = (snapshot.ecef - before.ecef).length();
    assert!((moved - 25.0).abs() < 0.01);

    // Negative and non-finite deltas do not move the aircraft
    let snapshot = app.frame(&input, -1.0);
    let again = app.frame(&input, f64::NAN);
    assert_eq!(snapshot.dt, 0.0);
    assert_eq!(again.ecef, snapshot.ecef);
}

#[test]
fn test_mode_toggles_through_input_source() {
    let mut app = FlightApp::new(&eastbound_config()).unwrap();
    let mut source = ToggleAt {
        frame: 0,
        toggles: vec![10, 20],
        input: ControlInput::piloted(0.0, 1.0, 0.0, 1.0),
    };
    let mut sink = Recorder::default();
    app.run_frames(&mut source, &mut sink, 30, 1.0 / 60.0);
    let frames = sink.0;

    assert!(frames[..10].iter().all(|s| s.mode == FlightMode::Piloted));
    assert!(frames[9].attitude.roll > 0.2);

    for snapshot in &frames[10..20] {
        assert_eq!(snapshot.mode, FlightMode::FreeFly);
        assert_eq!(snapshot.speed, 0.0);
        assert!(snapshot.attitude.roll.abs() < 1e-9);
    }
    let parked = frames[10].ecef;
    assert!(frames[10..20].iter().all(|s| s.ecef == parked));

    // Back in piloted mode the throttle drives the aircraft again
    assert!(frames[20..].iter().all(|s| s.mode == FlightMode::Piloted));
    assert!(frames[29].speed > 0.0);
    assert!((frames[29].ecef - parked).length() > 1.0);
}

#[test]
fn test_full_deflection_keeps_frame_orthonormal() {
    let mut app = FlightApp::new(&FlightConfig::default()).unwrap();
    let mut source = Constant(ControlInput::piloted(1.0, 1.0, 1.0, 1.0));
    let mut sink = Recorder::default();

    app.run_frames(&mut source, &mut sink, 20_000, 1.0 / 60.0);
    for snapshot in &sink.0 {
        assert!(snapshot.orientation.is_orthonormal());
        assert!(snapshot.geodetic.height().is_finite());
    }
}

#[test]
fn test_equatorial_circumnavigation() {
    let mut config = FlightConfig::default();
    config.start.latitude_deg = 0.0;
    config.start.longitude_deg = 0.0;
    config.start.heading_deg = 90.0;
    config.throttle = 1.0;
    config.max_speed = 1_000_000.0;
    let mut app = FlightApp::new(&config).unwrap();
    let mut source = Constant(ControlInput::piloted(0.0, 0.0, 0.0, 1.0));
    let mut sink = Recorder::default();

    // 100 km per frame, 400 frames: 40,000 km
    let last = app.run_frames(&mut source, &mut sink, 400, 0.1);

    let radius = WGS84.a + 1500.0;
    let expected = 40_000_000.0 / radius - std::f64::consts::TAU;
    assert!(last.geodetic.latitude().abs() < 1e-6);
    assert!((last.geodetic.longitude() - expected).abs() < 1e-6);
    assert!((last.geodetic.height() - 1500.0).abs() < 0.01);
    assert!(sink.0.iter().all(|s| s.render_offset.is_finite()));
}
