//! Angular and temporal unit conversions for planner inputs and PTR output.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Angular units accepted by the planners and the PTR format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngularUnit {
    Deg,
    Rad,
    ArcMin,
    ArcSec,
}

impl AngularUnit {
    /// Conversion factor from this unit to degrees.
    pub fn to_deg_factor(self) -> f64 {
        match self {
            AngularUnit::Deg => 1.0,
            AngularUnit::Rad => 180.0 / PI,
            AngularUnit::ArcMin => 1.0 / 60.0,
            AngularUnit::ArcSec => 1.0 / 3600.0,
        }
    }

    /// Unit label as it appears in PTR attributes.
    pub fn label(self) -> &'static str {
        match self {
            AngularUnit::Deg => "deg",
            AngularUnit::Rad => "rad",
            AngularUnit::ArcMin => "arcMin",
            AngularUnit::ArcSec => "arcSec",
        }
    }
}

/// Time units accepted by the planners and the PTR format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Sec,
    Min,
    Hour,
}

impl TimeUnit {
    /// Conversion factor from this unit to seconds.
    pub fn to_sec_factor(self) -> f64 {
        match self {
            TimeUnit::Sec => 1.0,
            TimeUnit::Min => 60.0,
            TimeUnit::Hour => 3600.0,
        }
    }

    /// Unit label as it appears in PTR attributes.
    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Sec => "sec",
            TimeUnit::Min => "min",
            TimeUnit::Hour => "hour",
        }
    }
}

/// Convert an angular value between units.
pub fn convert_angle(value: f64, from: AngularUnit, to: AngularUnit) -> f64 {
    if from == to {
        return value;
    }
    value * from.to_deg_factor() / to.to_deg_factor()
}

/// Convert a time value between units.
pub fn convert_time(value: f64, from: TimeUnit, to: TimeUnit) -> f64 {
    if from == to {
        return value;
    }
    value * from.to_sec_factor() / to.to_sec_factor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_conversions() {
        assert!((convert_angle(180.0, AngularUnit::Deg, AngularUnit::Rad) - PI).abs() < 1e-12);
        assert!((convert_angle(1.0, AngularUnit::Deg, AngularUnit::ArcMin) - 60.0).abs() < 1e-12);
        assert!((convert_angle(1.0, AngularUnit::Deg, AngularUnit::ArcSec) - 3600.0).abs() < 1e-9);
        assert_eq!(convert_angle(2.5, AngularUnit::Deg, AngularUnit::Deg), 2.5);
    }

    #[test]
    fn test_angle_round_trip() {
        let v = 1.2345;
        let out = convert_angle(
            convert_angle(v, AngularUnit::Deg, AngularUnit::ArcSec),
            AngularUnit::ArcSec,
            AngularUnit::Deg,
        );
        assert!((out - v).abs() < 1e-12);
    }

    #[test]
    fn test_time_conversions() {
        assert_eq!(convert_time(2.0, TimeUnit::Min, TimeUnit::Sec), 120.0);
        assert_eq!(convert_time(3600.0, TimeUnit::Sec, TimeUnit::Hour), 1.0);
        assert_eq!(convert_time(0.5, TimeUnit::Hour, TimeUnit::Min), 30.0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(AngularUnit::ArcMin.label(), "arcMin");
        assert_eq!(TimeUnit::Min.label(), "min");
    }
}
