//! Frame clock
//!
//! Measures wall-clock time between frames and clamps long stalls so a
//! single tick never integrates more than `max_dt` seconds of motion.

use std::time::Instant;
use tracing::{debug, warn};

/// Default upper bound for a single frame's `dt` (seconds)
pub const DEFAULT_MAX_DT: f64 = 0.1;

/// Clamp a frame delta to `[0, max_dt]`; non-finite deltas become zero
pub fn clamp_delta(dt: f64, max_dt: f64) -> f64 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt)
}

/// Monotonic clock producing per-frame deltas
#[derive(Debug)]
pub struct FrameClock {
    last: Option<Instant>,
    max_dt: f64,
    clamped_frames: u64,
}

impl FrameClock {
    pub fn new(max_dt: f64) -> Self {
        let max_dt = if max_dt.is_finite() && max_dt > 0.0 {
            max_dt
        } else {
            warn!("Invalid max frame dt {}, using {}", max_dt, DEFAULT_MAX_DT);
            DEFAULT_MAX_DT
        };
        Self {
            last: None,
            max_dt,
            clamped_frames: 0,
        }
    }

    pub fn max_dt(&self) -> f64 {
        self.max_dt
    }

    /// Number of frames whose delta had to be clamped
    pub fn clamped_frames(&self) -> u64 {
        self.clamped_frames
    }

    /// Time since the previous tick, clamped
    ///
    /// The first tick after construction or [`reset`](Self::reset) returns 0.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let raw = match self.last.replace(now) {
            Some(previous) => now.duration_since(previous).as_secs_f64(),
            None => 0.0,
        };
        self.clamp(raw)
    }

    /// Clamp an externally measured delta, counting and logging stalls
    pub fn clamp(&mut self, dt: f64) -> f64 {
        let clamped = clamp_delta(dt, self.max_dt);
        if dt.is_finite() && dt > self.max_dt {
            self.clamped_frames += 1;
            warn!(
                "Frame took {:.3}s, clamping to {:.3}s",
                dt, self.max_dt
            );
        } else if !dt.is_finite() || dt < 0.0 {
            debug!("Discarding invalid frame delta {}", dt);
        }
        clamped
    }

    /// Forget the previous tick so the next one starts from zero
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DT)
    }
}
