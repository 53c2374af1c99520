//! Geometry-provider capability interface.
//!
//! The planners only ever need three queries about a target body at a given
//! time: its apparent angular radius, the apparent drift rate of its center
//! across the boresight, and the illumination terminator. Any ephemeris
//! source (SPICE kernels, pre-computed tables, an analytic model) can back
//! this trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Apparent footprint of a body at one instant, in instrument-fixed
/// coordinates. Rebuilt for every refinement iteration; never cached across
/// iterations because the apparent size is time-dependent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FootprintEstimate {
    /// Apparent angular radius in radians.
    pub angular_radius: f64,
    /// Offset of the body center from the boresight, (x, y) in radians.
    pub center: (f64, f64),
}

/// Illumination state of the projected disk.
///
/// The illuminated region is modeled as the intersection of the disk with
/// the half-plane `dot(p - center, sun_direction) >= terminator_offset * r`:
/// -1.0 means the full disk is lit, +1.0 means none of it is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Illumination {
    /// Unit vector in the instrument plane pointing from the body center
    /// toward the sun.
    pub sun_direction: (f64, f64),
    /// Signed terminator offset along `sun_direction`, in body radii.
    pub terminator_offset: f64,
}

impl Illumination {
    /// Fully illuminated disk.
    pub fn full() -> Self {
        Self {
            sun_direction: (1.0, 0.0),
            terminator_offset: -1.0,
        }
    }

    /// Half-lit disk with the terminator through the center.
    pub fn half(sun_direction: (f64, f64)) -> Self {
        Self {
            sun_direction,
            terminator_offset: 0.0,
        }
    }
}

/// Queries answered by an external ephemeris source.
///
/// All angles are radians and all rates are radians per second; unit
/// conversion is the callers' concern. Calls may be expensive (ephemeris
/// lookups) and are treated as blocking; failures are not transient and are
/// never retried by the planners.
pub trait GeometryProvider {
    /// Apparent angular radius of `body` at `time`, in radians.
    fn angular_radius(&self, body: &str, time: DateTime<Utc>) -> Result<f64>;

    /// Apparent drift rate of the body center across the boresight while the
    /// spacecraft tracks it, in radians per second. Zero for a perfectly
    /// tracked static target; this rate is what smears a held exposure.
    fn apparent_drift_rate(&self, body: &str, time: DateTime<Utc>) -> Result<f64>;

    /// Illumination terminator of the projected disk at `time`.
    fn illumination(&self, body: &str, time: DateTime<Utc>) -> Result<Illumination>;

    /// Offset of the body center from the boresight. Zero under target
    /// tracking, which is the only attitude mode the planners emit.
    fn boresight_offset(&self, _body: &str, _time: DateTime<Utc>) -> Result<(f64, f64)> {
        Ok((0.0, 0.0))
    }

    /// Footprint estimate combining radius and center offset.
    fn footprint(&self, body: &str, time: DateTime<Utc>) -> Result<FootprintEstimate> {
        Ok(FootprintEstimate {
            angular_radius: self.angular_radius(body, time)?,
            center: self.boresight_offset(body, time)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_illumination_covers_disk() {
        let ill = Illumination::full();
        // Any point of the disk satisfies the half-plane condition.
        assert!(ill.terminator_offset <= -1.0 + f64::EPSILON);
    }
}
