//! Render origin management for camera-relative rendering
//!
//! Keeps the ENU origin close to the aircraft so that the offsets handed to
//! the renderer stay small enough for single precision.

use super::enu::EnuFrame;
use super::geodetic::GeodeticPosition;
use glam::DVec3;
use tracing::{debug, info, warn};

/// Rebase records kept before the oldest half is dropped
const MAX_REBASE_HISTORY: usize = 100;

/// Manages the ENU origin that render-space coordinates are relative to
#[derive(Debug, Clone)]
pub struct RenderOrigin {
    /// Current origin (always on the ellipsoid surface)
    origin: GeodeticPosition,
    /// Tangent frame at the origin
    frame: EnuFrame,
    /// Horizontal (east/north) distance that triggers a rebase (meters)
    pub rebase_threshold: f64,
    /// Whether rebasing is enabled
    pub enable_rebase: bool,
    /// ENU offset computed by the last update
    last_offset: DVec3,
    /// Total rebases since creation
    rebase_count: usize,
    /// History of rebases for debugging
    rebase_history: Vec<Rebase>,
}

/// Record of a rebase operation
#[derive(Debug, Clone, Copy)]
pub struct Rebase {
    /// When the rebase happened
    pub timestamp: std::time::Instant,
    /// Origin before the rebase
    pub old_origin: GeodeticPosition,
    /// Origin after the rebase
    pub new_origin: GeodeticPosition,
    /// ENU offset (against the old origin) that triggered it
    pub trigger_offset: DVec3,
}

impl RenderOrigin {
    /// Create an origin at the ground point below `origin`
    pub fn new(origin: GeodeticPosition, rebase_threshold: f64) -> Self {
        let origin = origin.ground_point();
        Self {
            origin,
            frame: EnuFrame::at(&origin),
            rebase_threshold,
            enable_rebase: true,
            last_offset: DVec3::ZERO,
            rebase_count: 0,
            rebase_history: Vec::new(),
        }
    }

    /// Create an origin that never rebases
    pub fn fixed(origin: GeodeticPosition) -> Self {
        Self {
            enable_rebase: false,
            ..Self::new(origin, f64::INFINITY)
        }
    }

    /// Current origin
    pub fn origin(&self) -> GeodeticPosition {
        self.origin
    }

    /// Tangent frame at the current origin
    pub fn frame(&self) -> &EnuFrame {
        &self.frame
    }

    /// ENU offset computed by the last [`RenderOrigin::update`]
    pub fn last_offset(&self) -> DVec3 {
        self.last_offset
    }

    /// ENU offset of an arbitrary ECEF point against the current origin
    pub fn offset_of(&self, ecef: DVec3) -> DVec3 {
        self.frame.ecef_to_enu(ecef)
    }

    /// Check whether an offset is far enough out to rebase
    ///
    /// Only the east/north distance counts. The new origin sits on the
    /// ground, so height alone can never be reduced by a rebase.
    pub fn should_rebase(&self, offset: DVec3) -> bool {
        self.enable_rebase && offset.truncate().length() > self.rebase_threshold
    }

    /// Update with the current position and rebase if needed
    ///
    /// Returns true if the origin moved. The offset stored afterwards is
    /// always against the origin in effect after the call.
    pub fn update(&mut self, position: &GeodeticPosition) -> bool {
        let ecef = position.to_ecef();
        let offset = self.frame.ecef_to_enu(ecef);

        if self.should_rebase(offset) {
            self.rebase_to(position, offset);
            self.last_offset = self.frame.ecef_to_enu(ecef);
            true
        } else {
            self.last_offset = offset;
            false
        }
    }

    /// Move the origin to the ground point below `position` unconditionally
    pub fn recenter(&mut self, position: &GeodeticPosition) {
        let ecef = position.to_ecef();
        let offset = self.frame.ecef_to_enu(ecef);
        self.rebase_to(position, offset);
        self.last_offset = self.frame.ecef_to_enu(ecef);
    }

    /// Enable or disable rebasing
    pub fn set_rebase_enabled(&mut self, enabled: bool) {
        let horizontal = self.last_offset.truncate().length();
        if !enabled && self.enable_rebase && horizontal > self.rebase_threshold {
            warn!(
                offset_m = horizontal,
                "Disabling rebasing while already past the threshold"
            );
        }
        self.enable_rebase = enabled;
    }

    /// Set the distance threshold for rebasing
    pub fn set_rebase_threshold(&mut self, threshold: f64) {
        debug!("Setting rebase threshold to: {}", threshold);
        self.rebase_threshold = threshold;
    }

    /// Recent rebases, oldest first
    pub fn rebase_history(&self) -> &[Rebase] {
        &self.rebase_history
    }

    /// Clear the rebase history
    pub fn clear_history(&mut self) {
        self.rebase_history.clear();
    }

    fn rebase_to(&mut self, position: &GeodeticPosition, trigger_offset: DVec3) {
        let old_origin = self.origin;
        let new_origin = position.ground_point();

        self.rebase_history.push(Rebase {
            timestamp: std::time::Instant::now(),
            old_origin,
            new_origin,
            trigger_offset,
        });
        if self.rebase_history.len() > MAX_REBASE_HISTORY {
            self.rebase_history.drain(..MAX_REBASE_HISTORY / 2);
        }

        self.origin = new_origin;
        self.frame = EnuFrame::at(&new_origin);
        self.rebase_count += 1;

        let (lat, lon) = new_origin.to_degrees();
        info!(
            lat_deg = lat,
            lon_deg = lon,
            trigger_offset_m = trigger_offset.length(),
            rebase_count = self.rebase_count,
            "Render origin rebased"
        );
    }

    /// Get statistics about the render origin
    pub fn stats(&self) -> RenderOriginStats {
        RenderOriginStats {
            origin: self.origin,
            last_offset: self.last_offset,
            rebases_performed: self.rebase_count,
            rebase_enabled: self.enable_rebase,
            rebase_threshold: self.rebase_threshold,
        }
    }
}

/// Statistics about the render origin
#[derive(Debug, Clone, Copy)]
pub struct RenderOriginStats {
    /// Current origin
    pub origin: GeodeticPosition,
    /// Offset of the tracked position from the origin
    pub last_offset: DVec3,
    /// Number of rebases performed
    pub rebases_performed: usize,
    /// Whether rebasing is enabled
    pub rebase_enabled: bool,
    /// Current rebase threshold
    pub rebase_threshold: f64,
}
