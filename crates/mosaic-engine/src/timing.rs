//! Timing model: exposure under the smear constraint, dwell, and slews.

use serde::{Deserialize, Serialize};

use crate::{Constraints, EngineError, Result};

/// Exposure time selection for one observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExposureBudget {
    /// Tightest smear-limited exposure over the sampled drift rates, if the
    /// drift constrains it at all.
    pub smear_limited_s: Option<f64>,
    /// Exposure actually used: min of the ceiling and the smear limit.
    pub used_s: f64,
}

/// Pick the exposure time from the ceiling and the smear constraint,
/// evaluated against apparent drift rates sampled over the observation
/// interval (worst case wins).
pub fn exposure_budget(constraints: &Constraints, drift_rates_rad_s: &[f64]) -> Result<ExposureBudget> {
    let smear_angle_rad = constraints.max_smear_px * constraints.instrument.pixel_size_rad();
    let mut smear_limited_s: Option<f64> = None;
    for &drift in drift_rates_rad_s {
        if drift <= 0.0 {
            continue; // target holds still; the ceiling governs
        }
        let limit = smear_angle_rad / drift;
        if !limit.is_finite() || limit <= 0.0 {
            return Err(EngineError::SmearInfeasible(format!(
                "drift rate {drift:.3e} rad/s leaves no positive exposure for \
                 {:.3} px smear",
                constraints.max_smear_px
            )));
        }
        smear_limited_s = Some(smear_limited_s.map_or(limit, |s: f64| s.min(limit)));
    }
    let used_s = smear_limited_s
        .map_or(constraints.exposure_ceiling_s, |s| {
            s.min(constraints.exposure_ceiling_s)
        });
    if used_s <= 0.0 {
        return Err(EngineError::SmearInfeasible(format!(
            "computed exposure {used_s:.3e} s is not positive"
        )));
    }
    Ok(ExposureBudget {
        smear_limited_s,
        used_s,
    })
}

/// Dwell time at one position: stabilization, one exposure per filter, and
/// the switches between filters.
pub fn dwell_s(constraints: &Constraints, exposure_s: f64) -> f64 {
    constraints.stabilization_s
        + exposure_s * constraints.filter_count as f64
        + constraints.filter_switch_s * (constraints.filter_count as f64 - 1.0)
}

/// Slew duration for an angular separation, in seconds. `distance` and the
/// constraint slew rate share the constraints' angular unit.
pub fn slew_s(constraints: &Constraints, distance: f64) -> f64 {
    distance.abs() / constraints.slew_rate_au_s()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Instrument;

    fn constraints() -> Constraints {
        let mut c = Constraints::new(Instrument::janus());
        c.stabilization_s = 5.0;
        c.filter_count = 4;
        c.filter_switch_s = 5.0;
        c.exposure_ceiling_s = 15.0;
        c
    }

    #[test]
    fn test_ceiling_governs_without_drift() {
        let c = constraints();
        let budget = exposure_budget(&c, &[0.0, 0.0]).unwrap();
        assert_eq!(budget.used_s, 15.0);
        assert!(budget.smear_limited_s.is_none());
    }

    #[test]
    fn test_smear_limit_wins_when_tighter() {
        let c = constraints();
        // Drift chosen so the smear limit lands at 13.125 s.
        let drift = 0.25 * c.instrument.pixel_size_rad() / 13.125;
        let budget = exposure_budget(&c, &[drift]).unwrap();
        assert!((budget.used_s - 13.125).abs() < 1e-9);
        // Smear inequality holds for the chosen exposure.
        assert!(budget.used_s * drift <= 0.25 * c.instrument.pixel_size_rad() + 1e-15);
    }

    #[test]
    fn test_worst_sample_wins() {
        let c = constraints();
        let slow = 0.25 * c.instrument.pixel_size_rad() / 20.0;
        let fast = 0.25 * c.instrument.pixel_size_rad() / 10.0;
        let budget = exposure_budget(&c, &[slow, fast]).unwrap();
        assert!((budget.used_s - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_drift_is_smear_infeasible() {
        let c = constraints();
        // Unbounded drift leaves a zero exposure window; this is a smear
        // infeasibility, not a configuration error.
        assert!(matches!(
            exposure_budget(&c, &[f64::INFINITY]),
            Err(EngineError::SmearInfeasible(_))
        ));
        assert!(matches!(
            exposure_budget(&c, &[f64::NAN]),
            Err(EngineError::SmearInfeasible(_))
        ));
    }

    #[test]
    fn test_dwell_includes_filter_switches() {
        let c = constraints();
        assert_eq!(dwell_s(&c, 13.125), 5.0 + 4.0 * 13.125 + 5.0 * 3.0);
        assert_eq!(dwell_s(&c, 13.125), 72.5);
    }

    #[test]
    fn test_slew_duration() {
        let c = constraints(); // 0.025 deg/s
        assert!((slew_s(&c, 1.0) - 40.0).abs() < 1e-9);
        assert_eq!(slew_s(&c, -2.0), slew_s(&c, 2.0));
    }
}
