//! Point-mosaic generation.

use chrono::{DateTime, Duration, Utc};
use mosaic_geometry::{convert_angle, AngularUnit, GeometryProvider};
use tracing::{info, warn};

use crate::layout::GridLayout;
use crate::pattern::{PatternKind, ScanPattern, TilePoint};
use crate::refine::{run_refinement, RefineOptions};
use crate::report::{MosaicResult, ObservationKind};
use crate::timing::{self, ExposureBudget};
use crate::{Constraints, EngineError, Result};

/// Shift a timestamp by a fractional number of seconds, rounded to the
/// nearest millisecond.
pub(crate) fn offset_time(start: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    start + Duration::milliseconds((seconds * 1000.0).round() as i64)
}

/// Plans point mosaics: serpentine grids of held exposures covering the
/// full disk or its sunlit part.
pub struct MosaicGenerator<'a, P: GeometryProvider> {
    provider: &'a P,
    target: String,
    constraints: Constraints,
}

impl<'a, P: GeometryProvider> MosaicGenerator<'a, P> {
    /// Constraints are validated once here; generation never re-checks them.
    pub fn new(provider: &'a P, target: &str, constraints: Constraints) -> Result<Self> {
        constraints.validate()?;
        Ok(Self {
            provider,
            target: target.to_string(),
            constraints,
        })
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Apparent-size ratio of the target over `duration_s` starting at
    /// `start`.
    fn growth_factor(&self, start: DateTime<Utc>, duration_s: f64) -> Result<f64> {
        let r0 = self.provider.angular_radius(&self.target, start)?;
        let r1 = self
            .provider
            .angular_radius(&self.target, offset_time(start, duration_s))?;
        if r0 <= 0.0 {
            return Err(EngineError::Geometry(
                mosaic_geometry::GeometryError::InvalidGeometry(format!(
                    "non-positive apparent radius {r0} for {}",
                    self.target
                )),
            ));
        }
        Ok(r1 / r0)
    }

    /// Lay out the grid and attach timing for one margin/exposure choice.
    fn build_pattern(
        &self,
        start: DateTime<Utc>,
        margin: f64,
        exposure_s: f64,
        sunside: bool,
    ) -> Result<ScanPattern> {
        let c = &self.constraints;
        let au = c.angular_unit;
        let footprint = self.provider.footprint(&self.target, start)?;
        let radius = convert_angle(footprint.angular_radius, AngularUnit::Rad, au);
        let center = (
            convert_angle(footprint.center.0, AngularUnit::Rad, au),
            convert_angle(footprint.center.1, AngularUnit::Rad, au),
        );
        let radius_with_margin = radius * (1.0 + margin);
        let fov = c.fov();

        let mut layout = GridLayout::build(2.0 * radius_with_margin, center, fov, c.overlap);
        if sunside {
            let illumination = self.provider.illumination(&self.target, start)?;
            layout.trim_sunside(center, radius_with_margin, radius, &illumination, fov);
            if layout.centers.is_empty() {
                return Err(EngineError::EmptyLayout(format!(
                    "no tile of the {}x{} grid touches the sunlit side of {}",
                    layout.x.count, layout.y.count, self.target
                )));
            }
        }

        let dwell = timing::dwell_s(c, exposure_s);
        let mut points = Vec::with_capacity(layout.centers.len());
        let mut prev: Option<(f64, f64)> = None;
        for &(px, py) in &layout.centers {
            let slew = match prev {
                Some((qx, qy)) => timing::slew_s(c, ((px - qx).powi(2) + (py - qy).powi(2)).sqrt()),
                None => 0.0,
            };
            points.push(TilePoint {
                x: px,
                y: py,
                rate_x: 0.0,
                rate_y: 0.0,
                hold_s: dwell,
                slew_from_prev_s: slew,
            });
            prev = Some((px, py));
        }

        let kind = if layout.regular {
            let (grid_start, delta) = layout.start_and_delta(center);
            PatternKind::Raster {
                x_points: layout.x.count,
                y_points: layout.y.count,
                start: grid_start,
                delta,
                point_slew_s: timing::slew_s(c, layout.y.step),
                line_slew_s: timing::slew_s(c, layout.x.step),
            }
        } else {
            PatternKind::Irregular
        };

        Ok(ScanPattern {
            target: self.target.clone(),
            start_time: start,
            kind,
            points,
            dwell_s: dwell,
            exposure_s,
            initial_delay_s: c.initial_delay_s,
            final_delay_s: c.final_delay_s,
            fov,
            angular_unit: au,
            time_unit: c.time_unit,
            target_radius: Some(radius),
            target_radius_with_margin: Some(radius_with_margin),
        })
    }

    fn finish(
        &self,
        observation: ObservationKind,
        pattern: ScanPattern,
        budget: ExposureBudget,
        margin_used: f64,
        growth_factor: f64,
        refinement: Option<crate::refine::IterationState>,
    ) -> MosaicResult {
        let c = &self.constraints;
        let image_count = pattern.position_count() as u64 * c.filter_count as u64;
        let data_volume_mbits = image_count as f64 * c.instrument.mbits_per_frame;
        let duration_s = pattern.duration_s();
        let avg_data_rate_kbit_s = data_volume_mbits * 1000.0 / duration_s;
        info!(
            target = %pattern.target,
            positions = pattern.position_count(),
            duration_s,
            "mosaic generated"
        );
        MosaicResult {
            observation,
            pattern,
            image_count,
            data_volume_mbits,
            avg_data_rate_kbit_s,
            exposure_s: budget.used_s,
            dwell_s: timing::dwell_s(c, budget.used_s),
            requested_margin: c.margin,
            achieved_margin: margin_used + 1.0 - growth_factor.max(1.0),
            growth_factor,
            refinement,
        }
    }

    /// Single-pass generation at the configured margin, ignoring the growth
    /// of the target over the pass.
    pub fn generate(&self, start: DateTime<Utc>, sunside: bool) -> Result<MosaicResult> {
        let c = &self.constraints;
        let drift_start = self.provider.apparent_drift_rate(&self.target, start)?;
        let mut budget = timing::exposure_budget(c, &[drift_start])?;
        let mut pattern = self.build_pattern(start, c.margin, budget.used_s, sunside)?;
        // The pass duration is only known now; re-check the smear limit
        // against the drift at its end and tighten the exposure if needed.
        let drift_end = self
            .provider
            .apparent_drift_rate(&self.target, offset_time(start, pattern.duration_s()))?;
        let checked = timing::exposure_budget(c, &[drift_start, drift_end])?;
        if checked.used_s < budget.used_s {
            warn!(
                exposure_s = budget.used_s,
                tightened_s = checked.used_s,
                "end-of-pass drift tightens the smear-limited exposure"
            );
            budget = checked;
            pattern = self.build_pattern(start, c.margin, budget.used_s, sunside)?;
        }
        let growth = self.growth_factor(start, pattern.duration_s())?;
        if growth > 1.0 + c.margin {
            warn!(
                growth_factor = growth,
                margin = c.margin,
                "target outgrows the margin over the pass"
            );
        }
        let observation = if sunside {
            ObservationKind::SunsideMosaic
        } else {
            ObservationKind::FullDiskMosaic
        };
        Ok(self.finish(observation, pattern, budget, c.margin, growth, None))
    }

    /// Refined generation: the margin is re-derived from the target's
    /// apparent growth until the duration stabilizes.
    pub fn generate_refined(
        &self,
        start: DateTime<Utc>,
        sunside: bool,
        options: &RefineOptions,
    ) -> Result<MosaicResult> {
        let c = &self.constraints;
        let ((pattern, budget), state) = run_refinement(
            options,
            c.margin,
            |duration_s| self.growth_factor(start, duration_s),
            |margin, duration_s| {
                let drifts = [
                    self.provider.apparent_drift_rate(&self.target, start)?,
                    self.provider
                        .apparent_drift_rate(&self.target, offset_time(start, duration_s))?,
                ];
                let budget = timing::exposure_budget(c, &drifts)?;
                let pattern = self.build_pattern(start, margin, budget.used_s, sunside)?;
                let duration = pattern.duration_s();
                Ok(((pattern, budget), duration))
            },
        )?;
        let observation = if sunside {
            ObservationKind::SunsideMosaic
        } else {
            ObservationKind::FullDiskMosaic
        };
        Ok(self.finish(
            observation,
            pattern,
            budget,
            state.margin,
            state.growth_factor,
            Some(state),
        ))
    }
}
