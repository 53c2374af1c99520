//! Mosaic/Scan Planning Engine
//!
//! Plans camera pointing sequences covering a target body's disk (or its
//! sunlit portion) under slew-rate, smear, and duration constraints. The
//! engine tiles the required angular footprint into a pointing grid or
//! continuous scan, derives slew/dwell/exposure timing, and iteratively
//! refines the coverage margin against the body's apparent growth over the
//! observation.

use mosaic_geometry::{AngularUnit, GeometryError, TimeUnit};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod generator;
pub mod layout;
pub mod pattern;
pub mod refine;
pub mod report;
pub mod scan;
pub mod timing;

pub use generator::MosaicGenerator;
pub use pattern::{PatternKind, ScanPattern, TilePoint};
pub use refine::{IterationState, MarginPolicy, RefineOptions, RefinePhase};
pub use report::{MosaicResult, ObservationKind};
pub use scan::ScanGenerator;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Smear constraint leaves no positive exposure time: {0}")]
    SmearInfeasible(String),
    #[error("Layout produced no points: {0}")]
    EmptyLayout(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Imaging instrument characteristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    /// Field of view (x, y) in degrees. For line-scan instruments the y
    /// value is the angular height of a single detector line.
    pub fov_deg: (f64, f64),
    /// Detector resolution (x, y) in pixels.
    pub resolution_px: (u32, u32),
    /// Raw bit depth per pixel.
    pub bits_per_pixel: u32,
    /// Uncompressed data volume of one frame (one line for scanners) in
    /// Mbits. Usually `x * y * bits_per_pixel / 1e6` but instruments with
    /// spectral channels produce more.
    pub mbits_per_frame: f64,
}

impl Instrument {
    /// JANUS framing camera: 1.72 x 1.29 deg, 2000 x 1504 px, 14 bit.
    pub fn janus() -> Self {
        let resolution_px = (2000, 1504);
        let bits_per_pixel = 14;
        Self {
            name: "JANUS".to_string(),
            fov_deg: (1.72, 1.29),
            resolution_px,
            bits_per_pixel,
            mbits_per_frame: resolution_px.0 as f64 * resolution_px.1 as f64
                * bits_per_pixel as f64
                / 1.0e6,
        }
    }

    /// MAJIS imaging spectrometer: 3.4 deg slit of 480 spatial pixels,
    /// 125 urad line height, 7.168 Mbits per acquired line.
    pub fn majis() -> Self {
        Self {
            name: "MAJIS".to_string(),
            fov_deg: (3.4, 125.0e-6_f64.to_degrees()),
            resolution_px: (480, 1),
            bits_per_pixel: 14,
            mbits_per_frame: 7.168,
        }
    }

    /// Angular size of one pixel along x, in radians.
    pub fn pixel_size_rad(&self) -> f64 {
        (self.fov_deg.0 / self.resolution_px.0 as f64).to_radians()
    }
}

/// Immutable observation constraints shared by all generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraints {
    pub instrument: Instrument,
    /// Attitude slew rate in deg/s.
    pub slew_rate_deg_s: f64,
    /// Maximum tolerated smear per exposure, in pixel fractions.
    pub max_smear_px: f64,
    /// Settling time after each slew, seconds.
    pub stabilization_s: f64,
    /// Filters imaged sequentially at each position.
    pub filter_count: u32,
    /// Time to switch between filters, seconds.
    pub filter_switch_s: f64,
    /// Upper bound on a single exposure, seconds.
    pub exposure_ceiling_s: f64,
    /// Extra coverage margin as a fraction of the body diameter.
    pub margin: f64,
    /// Minimum overlap between neighboring frames, fraction of FOV.
    pub overlap: f64,
    /// Units used for angles in patterns, reports, and pointing blocks.
    pub angular_unit: AngularUnit,
    /// Units used for durations in pointing blocks.
    pub time_unit: TimeUnit,
    /// Attitude-acquisition delay before the offset sequence, seconds.
    pub initial_delay_s: f64,
    /// Settling delay after the offset sequence, seconds.
    pub final_delay_s: f64,
}

impl Constraints {
    pub fn new(instrument: Instrument) -> Self {
        Self {
            instrument,
            slew_rate_deg_s: 0.025,
            max_smear_px: 0.25,
            stabilization_s: 0.0,
            filter_count: 1,
            filter_switch_s: 5.0,
            exposure_ceiling_s: 15.0,
            margin: 0.05,
            overlap: 0.1,
            angular_unit: AngularUnit::Deg,
            time_unit: TimeUnit::Min,
            initial_delay_s: 60.0,
            final_delay_s: 60.0,
        }
    }

    /// Reject malformed constraints before any geometry query is made.
    pub fn validate(&self) -> Result<()> {
        if self.instrument.fov_deg.0 <= 0.0 || self.instrument.fov_deg.1 <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "FOV must be positive: {:?}",
                self.instrument.fov_deg
            )));
        }
        if self.instrument.resolution_px.0 == 0 || self.instrument.resolution_px.1 == 0 {
            return Err(EngineError::InvalidConfig(
                "detector resolution must be positive".to_string(),
            ));
        }
        if self.slew_rate_deg_s <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "slew rate must be positive: {}",
                self.slew_rate_deg_s
            )));
        }
        if self.max_smear_px <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "max smear must be positive: {}",
                self.max_smear_px
            )));
        }
        if self.stabilization_s < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "stabilization time must be non-negative: {}",
                self.stabilization_s
            )));
        }
        if self.filter_count < 1 {
            return Err(EngineError::InvalidConfig(
                "filter count must be at least 1".to_string(),
            ));
        }
        if self.filter_switch_s < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "filter switch time must be non-negative: {}",
                self.filter_switch_s
            )));
        }
        if self.exposure_ceiling_s <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "exposure ceiling must be positive: {}",
                self.exposure_ceiling_s
            )));
        }
        if self.margin < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "margin must be non-negative: {}",
                self.margin
            )));
        }
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(EngineError::InvalidConfig(format!(
                "overlap must be in [0.0, 1.0): {}",
                self.overlap
            )));
        }
        if self.initial_delay_s < 0.0 || self.final_delay_s < 0.0 {
            return Err(EngineError::InvalidConfig(
                "delays must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// FOV in the configured angular unit.
    pub fn fov(&self) -> (f64, f64) {
        let au = self.angular_unit;
        (
            mosaic_geometry::convert_angle(self.instrument.fov_deg.0, AngularUnit::Deg, au),
            mosaic_geometry::convert_angle(self.instrument.fov_deg.1, AngularUnit::Deg, au),
        )
    }

    /// Slew rate in angular-unit per second.
    pub fn slew_rate_au_s(&self) -> f64 {
        mosaic_geometry::convert_angle(self.slew_rate_deg_s, AngularUnit::Deg, self.angular_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_janus_frame_volume() {
        let janus = Instrument::janus();
        assert!((janus.mbits_per_frame - 42.112).abs() < 1e-9);
        assert!((janus.pixel_size_rad() - (1.72_f64 / 2000.0).to_radians()).abs() < 1e-15);
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let mut c = Constraints::new(Instrument::janus());
        assert!(c.validate().is_ok());

        c.slew_rate_deg_s = 0.0;
        assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))));

        let mut c = Constraints::new(Instrument::janus());
        c.overlap = 1.0;
        assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))));

        let mut c = Constraints::new(Instrument::janus());
        c.margin = -0.1;
        assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))));

        let mut c = Constraints::new(Instrument::janus());
        c.exposure_ceiling_s = -1.0;
        assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))));

        let mut c = Constraints::new(Instrument::janus());
        c.instrument.fov_deg = (0.0, 1.29);
        assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))));

        let mut c = Constraints::new(Instrument::janus());
        c.filter_count = 0;
        assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_fov_unit_conversion() {
        let mut c = Constraints::new(Instrument::janus());
        c.angular_unit = AngularUnit::ArcMin;
        let (fx, fy) = c.fov();
        assert!((fx - 1.72 * 60.0).abs() < 1e-9);
        assert!((fy - 1.29 * 60.0).abs() < 1e-9);
    }
}
