//! Generation results and the human-readable planning report.

use mosaic_geometry::convert_angle;
use mosaic_geometry::AngularUnit;
use serde::{Deserialize, Serialize};

use crate::pattern::ScanPattern;
use crate::refine::IterationState;
use crate::Constraints;

/// What kind of observation a result describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationKind {
    FullDiskMosaic,
    SunsideMosaic,
    FullDiskScan,
    SunsideScan,
}

impl ObservationKind {
    pub fn label(self) -> &'static str {
        match self {
            ObservationKind::FullDiskMosaic => "Full disk mosaic",
            ObservationKind::SunsideMosaic => "Sunside mosaic",
            ObservationKind::FullDiskScan => "Full disk scan",
            ObservationKind::SunsideScan => "Sunside scan",
        }
    }
}

/// Final output of one generation call: the pattern plus derived report
/// fields. Created once and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosaicResult {
    pub observation: ObservationKind,
    pub pattern: ScanPattern,
    /// Positions times filters (frames for mosaics, lines for scans).
    pub image_count: u64,
    pub data_volume_mbits: f64,
    pub avg_data_rate_kbit_s: f64,
    pub exposure_s: f64,
    pub dwell_s: f64,
    /// Margin the caller asked for (before growth compensation).
    pub requested_margin: f64,
    /// Margin actually left at the end of the pass once growth is deducted.
    pub achieved_margin: f64,
    /// Apparent-size ratio end/start over the final duration.
    pub growth_factor: f64,
    /// Present for the refined variant only.
    pub refinement: Option<IterationState>,
}

impl MosaicResult {
    /// Render the planning report with its fixed field order.
    pub fn report(&self, constraints: &Constraints) -> String {
        let p = &self.pattern;
        let slew_rate_au_min = convert_angle(
            constraints.slew_rate_deg_s * 60.0,
            AngularUnit::Deg,
            constraints.angular_unit,
        );
        let mut out = String::new();
        out.push_str(&format!(
            "{} GENERATOR REPORT:\n",
            constraints.instrument.name
        ));
        out.push_str(&format!(" Observation type: {}\n", self.observation.label()));
        out.push_str(&format!(" Target: {}\n", p.target));
        out.push_str(&format!(" No of filters: {}\n", constraints.filter_count));
        out.push_str(&format!(" Max smear: {} px\n", constraints.max_smear_px));
        out.push_str(&format!(
            " Stabilization time: {:.3} s\n",
            constraints.stabilization_s
        ));
        out.push_str(&format!(
            " Slew rate: {:.3} {} / min\n",
            slew_rate_au_min,
            constraints.angular_unit.label()
        ));
        out.push_str(&format!(
            " Start time: {}\n",
            p.start_time.format("%Y-%m-%dT%H:%M:%S")
        ));
        out.push_str(&format!(
            " End time:   {}\n",
            p.end_time().format("%Y-%m-%dT%H:%M:%S")
        ));
        out.push_str(&format!(" Duration: {}\n", format_hms(p.duration_s())));
        out.push_str(&format!(
            " Total number of images: {} ({} positions, {} filters at each position).\n",
            self.image_count,
            p.position_count(),
            constraints.filter_count
        ));
        out.push_str(&format!(
            " Uncompressed data volume: {:.3} Mbits\n",
            self.data_volume_mbits
        ));
        out.push_str(&format!(
            " Uncompressed average data rate: {:.3} kbits/s\n",
            self.avg_data_rate_kbit_s
        ));
        out.push_str(&format!(" Used exposure time: {:.3} s\n", self.exposure_s));
        out.push_str(&format!(" Used dwell time: {:.3} s\n", self.dwell_s));
        if let Some(state) = &self.refinement {
            out.push_str(&format!("\n No of iterations: {}\n", state.iterations));
            out.push_str(&format!(
                " Requested margin: {:.3} %\n",
                self.requested_margin * 100.0
            ));
            out.push_str(&format!(
                " Real margin:      {:.3} %\n",
                self.achieved_margin * 100.0
            ));
            out.push_str(&format!(" Growth factor:    {:.3}\n", state.growth_factor));
            if !state.converged() {
                out.push_str(" WARNING: margin refinement did not converge.\n");
            }
        }
        out
    }
}

/// `h:mm:ss` rendering of a duration, dropping fractional seconds.
pub(crate) fn format_hms(duration_s: f64) -> String {
    let total = duration_s.round() as i64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h}:{m:02}:{s:02}")
}
