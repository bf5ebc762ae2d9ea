//! Headless flyover host
//!
//! Drives the flight core with a scripted pilot and logs what a renderer
//! would receive. Usage: `flyover [config.json] [seconds]`.

use flyover_engine::prelude::*;
use glam::DVec3;
use tracing::{error, info};

/// Fixed simulation rate of the host loop
const FRAME_RATE: f64 = 60.0;

/// Default flight length in seconds
const DEFAULT_DURATION: f64 = 120.0;

/// Scripted input: a climbing right turn, a mode switch, then a look around
struct ScriptedPilot {
    frame: u64,
    input: ControlInput,
}

impl ScriptedPilot {
    fn new() -> Self {
        Self {
            frame: 0,
            input: ControlInput::piloted(0.0, 0.0, 0.0, 0.8),
        }
    }

    fn seconds(&self) -> f64 {
        self.frame as f64 / FRAME_RATE
    }
}

impl InputSource for ScriptedPilot {
    fn poll(&mut self) -> ControlInput {
        self.input.clear_frame_data();
        let t = self.seconds();

        match t {
            t if t < 10.0 => {
                self.input.set_pitch(0.02);
                self.input.set_throttle(1.0);
            }
            t if t < 12.0 => {
                self.input.set_pitch(-0.1);
                self.input.set_roll(0.1);
            }
            t if t < 40.0 => {
                self.input.set_pitch(0.0);
                self.input.set_roll(0.0);
                self.input.set_yaw(0.5);
            }
            t if t < 42.0 => {
                self.input.set_yaw(0.0);
                self.input.set_roll(-0.1);
            }
            t if t < 60.0 => {
                self.input.set_roll(0.0);
            }
            _ => {
                if self.frame == (60.0 * FRAME_RATE) as u64 {
                    self.input.request_mode_toggle();
                }
                self.input.set_movement(DVec3::new(1.0, 0.0, 0.2));
                self.input.add_look_delta(1.0, 0.0);
            }
        }

        self.frame += 1;
        self.input
    }
}

/// Logs a summary once per simulated second and every rebase
struct LoggingSink {
    rebases: usize,
    repairs: usize,
}

impl FrameSink for LoggingSink {
    fn present(&mut self, snapshot: &FrameSnapshot) {
        if snapshot.rebased {
            self.rebases += 1;
            let (lat, lon) = snapshot.render_origin.to_degrees();
            info!(lat_deg = lat, lon_deg = lon, "Render origin moved");
        }
        if snapshot.frame_repaired {
            self.repairs += 1;
        }

        if snapshot.frame_index % FRAME_RATE as u64 == 0 {
            let (lat, lon) = snapshot.geodetic.to_degrees();
            info!(
                t = snapshot.frame_index as f64 / FRAME_RATE,
                mode = ?snapshot.mode,
                lat_deg = %format!("{lat:.6}"),
                lon_deg = %format!("{lon:.6}"),
                height_m = %format!("{:.1}", snapshot.geodetic.height()),
                heading_deg = %format!("{:.1}", snapshot.attitude.heading.to_degrees()),
                pitch_deg = %format!("{:.1}", snapshot.attitude.pitch.to_degrees()),
                speed = snapshot.speed,
                render_offset = ?snapshot.render_offset,
                "Flight"
            );
        }
    }
}

fn main() {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => match FlightConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {path}: {e}");
                std::process::exit(1);
            }
        },
        None => FlightConfig::default(),
    };

    flyover_engine::init_logging(config.log_filter.as_deref());
    info!("Starting flyover");

    let duration = match args.next().map(|arg| arg.parse::<f64>()) {
        Some(Ok(seconds)) if seconds.is_finite() && seconds >= 0.0 => seconds,
        Some(_) => {
            error!("Duration must be a non-negative number of seconds");
            std::process::exit(1);
        }
        None => DEFAULT_DURATION,
    };

    let mut app = match FlightApp::new(&config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Invalid flight configuration");
            std::process::exit(1);
        }
    };

    let mut pilot = ScriptedPilot::new();
    let mut sink = LoggingSink {
        rebases: 0,
        repairs: 0,
    };
    let frames = (duration * FRAME_RATE).round() as u64;
    let last = app.run_frames(&mut pilot, &mut sink, frames, 1.0 / FRAME_RATE);

    let (lat, lon) = last.geodetic.to_degrees();
    info!(
        frames,
        rebases = sink.rebases,
        frame_repairs = sink.repairs,
        lat_deg = lat,
        lon_deg = lon,
        height_m = last.geodetic.height(),
        "Flight finished"
    );
}
