//! Pointing patterns: ordered tile sequences with per-point timing.

use chrono::{DateTime, Duration, Utc};
use mosaic_geometry::{AngularUnit, TimeUnit};
use serde::{Deserialize, Serialize};

/// One pointing position in acquisition order.
///
/// For point mosaics the rates are zero and `hold_s` is the dwell time; for
/// continuous scans the rates describe the sweep and `hold_s` is the sweep
/// duration of the segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilePoint {
    /// Offset angles from the target center, in the pattern's angular unit.
    pub x: f64,
    pub y: f64,
    /// Angular rates during acquisition, angular-unit per second.
    pub rate_x: f64,
    pub rate_y: f64,
    /// Time spent acquiring at this point, seconds.
    pub hold_s: f64,
    /// Slew duration from the previous point, seconds; zero for the first
    /// point, whose acquisition is part of the initial delay.
    pub slew_from_prev_s: f64,
}

/// Regularity of a pattern, fixed once at layout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternKind {
    /// Full untrimmed rectangular raster; eligible for the compact raster
    /// serialization because its geometry and timing are uniform.
    Raster {
        x_points: usize,
        y_points: usize,
        start: (f64, f64),
        delta: (f64, f64),
        point_slew_s: f64,
        line_slew_s: f64,
    },
    /// Trimmed, irregular, or continuously-sweeping pattern; requires the
    /// explicit per-point serialization.
    Irregular,
}

/// An ordered pointing sequence covering a target footprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanPattern {
    pub target: String,
    pub start_time: DateTime<Utc>,
    pub kind: PatternKind,
    pub points: Vec<TilePoint>,
    /// Uniform dwell per position for point mosaics, seconds.
    pub dwell_s: f64,
    /// Exposure per frame (per line for scans), seconds.
    pub exposure_s: f64,
    /// Delay before the offset sequence starts (attitude acquisition plus,
    /// for scans, the border slew onto the first segment), seconds.
    pub initial_delay_s: f64,
    /// Delay after the offset sequence ends, seconds.
    pub final_delay_s: f64,
    /// Footprint size of one tile, in `angular_unit`.
    pub fov: (f64, f64),
    pub angular_unit: AngularUnit,
    pub time_unit: TimeUnit,
    /// Apparent target radius at start, in `angular_unit`.
    pub target_radius: Option<f64>,
    /// Radius expanded by the achieved margin, in `angular_unit`.
    pub target_radius_with_margin: Option<f64>,
}

impl ScanPattern {
    pub fn position_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_raster(&self) -> bool {
        matches!(self.kind, PatternKind::Raster { .. })
    }

    /// Duration of the offset sequence alone: slews plus per-point holds.
    pub fn pointing_duration_s(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.slew_from_prev_s + p.hold_s)
            .sum()
    }

    /// Total duration including initial and final delays, seconds.
    pub fn duration_s(&self) -> f64 {
        self.initial_delay_s + self.pointing_duration_s() + self.final_delay_s
    }

    /// Earliest end time, truncated to whole seconds. The untruncated
    /// `duration_s` stays authoritative for all arithmetic.
    pub fn end_time(&self) -> DateTime<Utc> {
        let millis = (self.duration_s() * 1000.0).round();
        let whole_s = (millis / 1000.0).floor() as i64;
        self.start_time + Duration::seconds(whole_s)
    }

    /// Start of the offset sequence within the pointing block.
    pub fn offset_start_time(&self) -> DateTime<Utc> {
        let millis = (self.initial_delay_s * 1000.0).round();
        let whole_s = (millis / 1000.0).floor() as i64;
        self.start_time + Duration::seconds(whole_s)
    }
}
