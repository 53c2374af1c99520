//! Observation-block model and its PTR text rendering.

use chrono::{DateTime, Utc};
use mosaic_engine::{PatternKind, ScanPattern};
use mosaic_geometry::{convert_time, AngularUnit, TimeUnit};
use serde::Serialize;

use crate::{BlockError, Result};

/// Compact offset form for full untrimmed rasters. Angles are in the
/// block's angular unit, times in its time unit.
#[derive(Debug, Clone, Serialize)]
pub struct RasterBlock {
    pub x_points: usize,
    pub y_points: usize,
    pub x_start: f64,
    pub y_start: f64,
    pub x_delta: f64,
    pub y_delta: f64,
    pub point_slew_time: f64,
    pub line_slew_time: f64,
    pub dwell_time: f64,
}

/// Explicit per-point offset form for trimmed mosaics and scans. The five
/// arrays are parallel, one entry per pointing position; rates are in
/// angular-unit per second.
#[derive(Debug, Clone, Serialize)]
pub struct CustomBlock {
    pub delta_times: Vec<f64>,
    pub x_angles: Vec<f64>,
    pub x_rates: Vec<f64>,
    pub y_angles: Vec<f64>,
    pub y_rates: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub enum OffsetForm {
    Raster(RasterBlock),
    Custom(CustomBlock),
}

/// One `<block ref="OBS">` of a PTR timeline.
#[derive(Debug, Clone, Serialize)]
pub struct PointingBlock {
    pub target: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// When the offset sequence starts; the initial delay sits between the
    /// block start and this instant.
    pub offset_start_time: DateTime<Utc>,
    pub angular_unit: AngularUnit,
    pub time_unit: TimeUnit,
    pub form: OffsetForm,
}

impl PointingBlock {
    /// Serialize a pattern. Full rasters take the compact form; everything
    /// else gets the explicit per-point arrays.
    pub fn from_pattern(pattern: &ScanPattern) -> Result<PointingBlock> {
        if pattern.points.is_empty() {
            return Err(BlockError::EmptyPattern(pattern.target.clone()));
        }
        let tu = pattern.time_unit;
        let to_tu = |seconds: f64| convert_time(seconds, TimeUnit::Sec, tu);

        let form = match &pattern.kind {
            PatternKind::Raster {
                x_points,
                y_points,
                start,
                delta,
                point_slew_s,
                line_slew_s,
            } => OffsetForm::Raster(RasterBlock {
                x_points: *x_points,
                y_points: *y_points,
                x_start: start.0,
                y_start: start.1,
                x_delta: delta.0,
                y_delta: delta.1,
                point_slew_time: to_tu(*point_slew_s),
                line_slew_time: to_tu(*line_slew_s),
                dwell_time: to_tu(pattern.dwell_s),
            }),
            PatternKind::Irregular => {
                let n = pattern.points.len();
                let mut custom = CustomBlock {
                    delta_times: Vec::with_capacity(n),
                    x_angles: Vec::with_capacity(n),
                    x_rates: Vec::with_capacity(n),
                    y_angles: Vec::with_capacity(n),
                    y_rates: Vec::with_capacity(n),
                };
                for p in &pattern.points {
                    custom.delta_times.push(to_tu(p.slew_from_prev_s + p.hold_s));
                    custom.x_angles.push(p.x);
                    custom.x_rates.push(p.rate_x);
                    custom.y_angles.push(p.y);
                    custom.y_rates.push(p.rate_y);
                }
                OffsetForm::Custom(custom)
            }
        };

        Ok(PointingBlock {
            target: pattern.target.clone(),
            start_time: pattern.start_time,
            end_time: pattern.end_time(),
            offset_start_time: pattern.offset_start_time(),
            angular_unit: pattern.angular_unit,
            time_unit: tu,
            form,
        })
    }

    /// Render the PTR text block, all numerics rounded to `decimal_places`.
    /// Rounding happens here only; internal arithmetic keeps full precision.
    pub fn render(&self, decimal_places: usize) -> String {
        let au = self.angular_unit.label();
        let tu = self.time_unit.label();
        let num = |v: f64| format!("{v:.decimal_places$}");
        let list = |vs: &[f64]| {
            vs.iter()
                .map(|&v| num(v))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let stamp = |t: DateTime<Utc>| t.format("%Y-%m-%dT%H:%M:%S").to_string();

        let mut out = String::new();
        out.push_str("<block ref=\"OBS\">\n");
        out.push_str(&format!("\t<startTime>{}</startTime>\n", stamp(self.start_time)));
        out.push_str(&format!("\t<endTime>{}</endTime>\n", stamp(self.end_time)));
        out.push_str("\t<attitude ref=\"track\">\n");
        out.push_str("\t\t<boresight ref=\"SC_Zaxis\"/>\n");
        out.push_str(&format!("\t\t<target ref=\"{}\"/>\n", self.target));
        out.push_str("\t\t<offsetRefAxis frame=\"SC\">\n");
        out.push_str("\t\t\t<x>1.0</x>\n");
        out.push_str("\t\t\t<y>0.0</y>\n");
        out.push_str("\t\t\t<z>0.0</z>\n");
        out.push_str("\t\t</offsetRefAxis>\n");
        match &self.form {
            OffsetForm::Raster(r) => {
                out.push_str("\t\t<offsetAngles ref=\"raster\">\n");
                out.push_str(&format!(
                    "\t\t\t<startTime>{}</startTime>\n",
                    stamp(self.offset_start_time)
                ));
                out.push_str(&format!("\t\t\t<xPoints>{}</xPoints>\n", r.x_points));
                out.push_str(&format!("\t\t\t<yPoints>{}</yPoints>\n", r.y_points));
                out.push_str(&format!(
                    "\t\t\t<xStart units=\"{au}\">{}</xStart>\n",
                    num(r.x_start)
                ));
                out.push_str(&format!(
                    "\t\t\t<yStart units=\"{au}\">{}</yStart>\n",
                    num(r.y_start)
                ));
                out.push_str(&format!(
                    "\t\t\t<xDelta units=\"{au}\">{}</xDelta>\n",
                    num(r.x_delta)
                ));
                out.push_str(&format!(
                    "\t\t\t<yDelta units=\"{au}\">{}</yDelta>\n",
                    num(r.y_delta)
                ));
                out.push_str(&format!(
                    "\t\t\t<pointSlewTime units=\"{tu}\">{}</pointSlewTime>\n",
                    num(r.point_slew_time)
                ));
                out.push_str(&format!(
                    "\t\t\t<lineSlewTime units=\"{tu}\">{}</lineSlewTime>\n",
                    num(r.line_slew_time)
                ));
                out.push_str(&format!(
                    "\t\t\t<dwellTime units=\"{tu}\">{}</dwellTime>\n",
                    num(r.dwell_time)
                ));
                out.push_str("\t\t\t<lineAxis>Y</lineAxis>\n");
                out.push_str("\t\t\t<keepLineDir>false</keepLineDir>\n");
                out.push_str("\t\t</offsetAngles>\n");
            }
            OffsetForm::Custom(c) => {
                out.push_str("\t\t<offsetAngles ref=\"custom\">\n");
                out.push_str(&format!(
                    "\t\t\t<startTime>{}</startTime>\n",
                    stamp(self.offset_start_time)
                ));
                out.push_str(&format!(
                    "\t\t\t<deltaTimes units=\"{tu}\">{}</deltaTimes>\n",
                    list(&c.delta_times)
                ));
                out.push_str(&format!(
                    "\t\t\t<xAngles units=\"{au}\">{}</xAngles>\n",
                    list(&c.x_angles)
                ));
                out.push_str(&format!(
                    "\t\t\t<xRates units=\"{au}/sec\">{}</xRates>\n",
                    list(&c.x_rates)
                ));
                out.push_str(&format!(
                    "\t\t\t<yAngles units=\"{au}\">{}</yAngles>\n",
                    list(&c.y_angles)
                ));
                out.push_str(&format!(
                    "\t\t\t<yRates units=\"{au}/sec\">{}</yRates>\n",
                    list(&c.y_rates)
                ));
                out.push_str("\t\t</offsetAngles>\n");
            }
        }
        out.push_str("\t\t<phaseAngle ref=\"powerOptimised\">\n");
        out.push_str("\t\t\t<yDir>false</yDir>\n");
        out.push_str("\t\t</phaseAngle>\n");
        out.push_str("\t</attitude>\n");
        out.push_str("</block>\n");
        out
    }
}
