//! Continuous-scan generation for line-scan instruments.
//!
//! A scan sweeps the slit along y in vertical segments, acquiring one
//! detector line per exposure while the spacecraft rotates at the
//! measurement rate. Segments are laid out along x like mosaic columns and
//! traversed serpentine fashion, with a slow border slew onto the first
//! segment and off the last one.

use chrono::{DateTime, Utc};
use mosaic_geometry::{convert_angle, AngularUnit, GeometryProvider, Illumination};
use tracing::info;

use crate::generator::offset_time;
use crate::layout::place_axis;
use crate::pattern::{PatternKind, ScanPattern, TilePoint};
use crate::refine::{run_refinement, RefineOptions};
use crate::report::{MosaicResult, ObservationKind};
use crate::timing::{self, ExposureBudget};
use crate::{Constraints, EngineError, Result};

/// Slow attitude slew across the disk border, seconds each side.
const BORDER_SLEW_S: f64 = 300.0;
/// Attitude-acquisition delay before the border slew, seconds.
const SCAN_INITIAL_DELAY_S: f64 = 10.0;

/// x-interval of the sunlit part of the disk, relative to the disk center.
///
/// The lit region is the disk (radius expanded by the margin) cut by the
/// terminator half-plane; its x-extremes are attained either at the chord
/// endpoints or at the disk's own x-extremes when those are lit.
fn sunlit_x_extent(
    radius_with_margin: f64,
    body_radius: f64,
    illumination: &Illumination,
) -> Option<(f64, f64)> {
    let (sx, sy) = illumination.sun_direction;
    // Offsets at or beyond one body radius mean the disk is entirely lit or
    // entirely dark regardless of the margin expansion.
    if illumination.terminator_offset <= -1.0 {
        return Some((-radius_with_margin, radius_with_margin));
    }
    if illumination.terminator_offset >= 1.0 {
        return None;
    }
    let threshold = illumination.terminator_offset * body_radius;
    let half_chord = (radius_with_margin * radius_with_margin - threshold * threshold).sqrt();
    // Chord endpoints of the terminator cut.
    let mut min_x = (threshold * sx - half_chord * sy).min(threshold * sx + half_chord * sy);
    let mut max_x = (threshold * sx - half_chord * sy).max(threshold * sx + half_chord * sy);
    // Disk x-extremes, when they fall on the lit side.
    if radius_with_margin * sx >= threshold {
        max_x = max_x.max(radius_with_margin);
    }
    if -radius_with_margin * sx >= threshold {
        min_x = min_x.min(-radius_with_margin);
    }
    Some((min_x, max_x))
}

/// Plans continuous scans: slit sweeps covering the full disk or its
/// sunlit part.
pub struct ScanGenerator<'a, P: GeometryProvider> {
    provider: &'a P,
    target: String,
    constraints: Constraints,
}

impl<'a, P: GeometryProvider> ScanGenerator<'a, P> {
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

    /// Lay out the sweep segments and attach timing for one margin/exposure
    /// choice.
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
        let span_y = 2.0 * radius_with_margin;

        // Segment placement along x; the sunside variant covers only the
        // x-interval the lit region occupies.
        let (x_width, x_center) = if sunside {
            let illumination = self.provider.illumination(&self.target, start)?;
            let (min_x, max_x) = sunlit_x_extent(radius_with_margin, radius, &illumination)
                .ok_or_else(|| {
                    EngineError::EmptyLayout(format!(
                        "terminator leaves no sunlit part of {} to scan",
                        self.target
                    ))
                })?;
            (max_x - min_x, center.0 + (min_x + max_x) / 2.0)
        } else {
            (span_y, center.0)
        };
        let x = place_axis(x_width, fov.0, c.overlap);

        // One line per exposure; the sweep rate follows from the line height.
        let sweep_rate = fov.1 / exposure_s;
        let sweep_s = span_y / sweep_rate;
        let line_slew_s = timing::slew_s(c, x.step);

        let mut points = Vec::with_capacity(x.count);
        for (i, px) in x.positions().into_iter().enumerate() {
            // Serpentine: even segments sweep downward from the top edge.
            let downward = i % 2 == 0;
            points.push(TilePoint {
                x: x_center + px,
                y: center.1 + if downward { span_y / 2.0 } else { -span_y / 2.0 },
                rate_x: 0.0,
                rate_y: if downward { -sweep_rate } else { sweep_rate },
                hold_s: sweep_s,
                slew_from_prev_s: if i == 0 { 0.0 } else { line_slew_s },
            });
        }

        Ok(ScanPattern {
            target: self.target.clone(),
            start_time: start,
            kind: PatternKind::Irregular,
            points,
            dwell_s: sweep_s,
            exposure_s,
            initial_delay_s: SCAN_INITIAL_DELAY_S + BORDER_SLEW_S,
            final_delay_s: c.final_delay_s + BORDER_SLEW_S,
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
        // One line per exposure over every sweep.
        let lines_per_segment = (pattern.dwell_s / budget.used_s).ceil();
        let image_count = (pattern.position_count() as f64 * lines_per_segment) as u64;
        let data_volume_mbits = image_count as f64 * c.instrument.mbits_per_frame;
        let duration_s = pattern.duration_s();
        let avg_data_rate_kbit_s = data_volume_mbits * 1000.0 / duration_s;
        info!(
            target = %pattern.target,
            segments = pattern.position_count(),
            lines = image_count,
            duration_s,
            "scan generated"
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

    /// Single-pass generation at the configured margin.
    pub fn generate(&self, start: DateTime<Utc>, sunside: bool) -> Result<MosaicResult> {
        let c = &self.constraints;
        let drift = self.provider.apparent_drift_rate(&self.target, start)?;
        let budget = timing::exposure_budget(c, &[drift])?;
        let pattern = self.build_pattern(start, c.margin, budget.used_s, sunside)?;
        let growth = self.growth_factor(start, pattern.duration_s())?;
        let observation = if sunside {
            ObservationKind::SunsideScan
        } else {
            ObservationKind::FullDiskScan
        };
        Ok(self.finish(observation, pattern, budget, c.margin, growth, None))
    }

    /// Refined generation: margin re-derived from the apparent growth until
    /// the duration stabilizes.
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
            ObservationKind::SunsideScan
        } else {
            ObservationKind::FullDiskScan
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Instrument;
    use chrono::TimeZone;
    use mosaic_geometry::SyntheticGeometry;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 4, 26, 3, 40, 47).unwrap()
    }

    fn majis_constraints() -> Constraints {
        let mut c = Constraints::new(Instrument::majis());
        c.filter_count = 1;
        c.exposure_ceiling_s = 2.0;
        c
    }

    #[test]
    fn test_sunlit_extent_half_disk() {
        let ill = Illumination::half((1.0, 0.0));
        let (min_x, max_x) = sunlit_x_extent(2.1, 2.0, &ill).unwrap();
        assert!((min_x - 0.0).abs() < 1e-12);
        assert!((max_x - 2.1).abs() < 1e-12);
    }

    #[test]
    fn test_sunlit_extent_full_and_empty() {
        let full = Illumination::full();
        assert_eq!(sunlit_x_extent(2.1, 2.0, &full), Some((-2.1, 2.1)));
        let dark = Illumination {
            sun_direction: (1.0, 0.0),
            terminator_offset: 2.0,
        };
        assert_eq!(sunlit_x_extent(2.1, 2.0, &dark), None);
    }

    #[test]
    fn test_full_disk_scan_structure() {
        let c = majis_constraints();
        let geometry = SyntheticGeometry::fixed("GANYMEDE", start(), 2.0_f64.to_radians());
        let generator = ScanGenerator::new(&geometry, "GANYMEDE", c).unwrap();

        let result = generator.generate(start(), false).unwrap();
        let p = &result.pattern;
        // 4.2 deg disk against a 3.4 deg slit with 10 % overlap: two
        // segments at +-0.4 deg.
        assert_eq!(p.position_count(), 2);
        assert!(!p.is_raster());
        assert!((p.points[0].x + 0.4).abs() < 1e-9);
        assert!((p.points[1].x - 0.4).abs() < 1e-9);
        // Serpentine sweep: down then up.
        assert!(p.points[0].rate_y < 0.0);
        assert!(p.points[1].rate_y > 0.0);
        assert_eq!(p.points[0].y, -p.points[1].y);
        // Border slews are folded into the delays.
        assert_eq!(p.initial_delay_s, 310.0);
        assert_eq!(p.final_delay_s, 360.0);
        let expected = p.initial_delay_s
            + 2.0 * p.points[0].hold_s
            + p.points[1].slew_from_prev_s
            + p.final_delay_s;
        assert!((p.duration_s() - expected).abs() < 1e-9);
        assert_eq!(result.observation, ObservationKind::FullDiskScan);
    }

    #[test]
    fn test_sweep_rate_matches_line_exposure() {
        let c = majis_constraints();
        let geometry = SyntheticGeometry::fixed("GANYMEDE", start(), 2.0_f64.to_radians());
        let generator = ScanGenerator::new(&geometry, "GANYMEDE", c).unwrap();

        let result = generator.generate(start(), false).unwrap();
        let p = &result.pattern;
        let line_height_deg = 125.0e-6_f64.to_degrees();
        // rate * exposure = one line height.
        assert!((p.points[0].rate_y.abs() * result.exposure_s - line_height_deg).abs() < 1e-12);
        // Sweep time covers the margined disk.
        let span = 2.0 * p.target_radius_with_margin.unwrap();
        assert!((p.points[0].hold_s * p.points[0].rate_y.abs() - span).abs() < 1e-9);
    }

    #[test]
    fn test_sunside_scan_narrows_coverage() {
        let c = majis_constraints();
        let geometry = SyntheticGeometry::fixed("GANYMEDE", start(), 2.0_f64.to_radians())
            .with_illumination(Illumination::half((1.0, 0.0)));
        let generator = ScanGenerator::new(&geometry, "GANYMEDE", c).unwrap();

        let full = generator.generate(start(), false).unwrap();
        let sunside = generator.generate(start(), true).unwrap();
        assert!(sunside.pattern.position_count() < full.pattern.position_count());
        // The single remaining segment is centered on the lit half.
        assert_eq!(sunside.pattern.position_count(), 1);
        assert!((sunside.pattern.points[0].x - 1.05).abs() < 1e-9);
        assert_eq!(sunside.observation, ObservationKind::SunsideScan);
    }

    #[test]
    fn test_refined_scan_converges() {
        let c = majis_constraints();
        let geometry = SyntheticGeometry::fixed("GANYMEDE", start(), 2.0_f64.to_radians())
            .with_range_rate(-2.0);
        let generator = ScanGenerator::new(&geometry, "GANYMEDE", c).unwrap();

        let result = generator
            .generate_refined(start(), false, &RefineOptions::default())
            .unwrap();
        let state = result.refinement.unwrap();
        assert!(state.converged());
        assert!(state.growth_factor > 1.0);
        assert!((state.duration_s - result.pattern.duration_s()).abs() < 1e-9);
    }
}
