//! Analytic geometry provider for tests and planning studies.
//!
//! Models a flyby as a linear range profile: the apparent angular radius is
//! `asin(body_radius / range(t))` with `range(t) = range_at_epoch +
//! range_rate * (t - epoch)`. An approaching spacecraft (negative range
//! rate) therefore sees the body grow during an observation, which is
//! exactly the effect the iterative duration refiner has to chase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::{GeometryProvider, Illumination};
use crate::{GeometryError, Result};

/// Geometry of a single body under a linear-range flyby model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticGeometry {
    /// Body name answered by this provider.
    pub body: String,
    /// Epoch at which `range_at_epoch` holds.
    pub epoch: DateTime<Utc>,
    /// Body radius in km.
    pub body_radius_km: f64,
    /// Spacecraft-to-body range at epoch in km.
    pub range_at_epoch_km: f64,
    /// Range rate in km/s; negative while approaching.
    pub range_rate_km_s: f64,
    /// Apparent boresight drift rate in rad/s, constant over the window.
    pub drift_rate_rad_s: f64,
    /// Illumination state, constant over the window.
    pub illumination: Illumination,
    /// Validity window half-width in seconds around the epoch; queries
    /// outside it fail with a coverage gap like an unloaded kernel would.
    pub coverage_half_width_s: f64,
}

impl SyntheticGeometry {
    /// Provider for a body that keeps a fixed apparent radius.
    pub fn fixed(body: &str, epoch: DateTime<Utc>, angular_radius_rad: f64) -> Self {
        // Back out a range that yields the requested apparent radius.
        let range = 1.0e6;
        Self {
            body: body.to_string(),
            epoch,
            body_radius_km: range * angular_radius_rad.sin(),
            range_at_epoch_km: range,
            range_rate_km_s: 0.0,
            drift_rate_rad_s: 0.0,
            illumination: Illumination::full(),
            coverage_half_width_s: f64::INFINITY,
        }
    }

    pub fn with_drift_rate(mut self, drift_rate_rad_s: f64) -> Self {
        self.drift_rate_rad_s = drift_rate_rad_s;
        self
    }

    pub fn with_illumination(mut self, illumination: Illumination) -> Self {
        self.illumination = illumination;
        self
    }

    pub fn with_range_rate(mut self, range_rate_km_s: f64) -> Self {
        self.range_rate_km_s = range_rate_km_s;
        self
    }

    pub fn with_coverage_half_width_s(mut self, half_width_s: f64) -> Self {
        self.coverage_half_width_s = half_width_s;
        self
    }

    fn check_query(&self, body: &str, time: DateTime<Utc>) -> Result<f64> {
        if body != self.body {
            return Err(GeometryError::UnknownBody(body.to_string()));
        }
        let dt = (time - self.epoch).num_milliseconds() as f64 / 1000.0;
        if dt.abs() > self.coverage_half_width_s {
            return Err(GeometryError::CoverageGap {
                body: body.to_string(),
                time,
            });
        }
        Ok(dt)
    }
}

impl GeometryProvider for SyntheticGeometry {
    fn angular_radius(&self, body: &str, time: DateTime<Utc>) -> Result<f64> {
        let dt = self.check_query(body, time)?;
        let range = self.range_at_epoch_km + self.range_rate_km_s * dt;
        if range <= self.body_radius_km {
            return Err(GeometryError::InvalidGeometry(format!(
                "range {range:.3} km inside body radius {:.3} km",
                self.body_radius_km
            )));
        }
        Ok((self.body_radius_km / range).asin())
    }

    fn apparent_drift_rate(&self, body: &str, time: DateTime<Utc>) -> Result<f64> {
        self.check_query(body, time)?;
        Ok(self.drift_rate_rad_s)
    }

    fn illumination(&self, body: &str, time: DateTime<Utc>) -> Result<Illumination> {
        self.check_query(body, time)?;
        Ok(self.illumination)
    }
}
