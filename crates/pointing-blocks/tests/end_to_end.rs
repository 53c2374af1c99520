//! Planner-to-PTR pipeline checks.

use chrono::{DateTime, TimeZone, Utc};
use mosaic_engine::{Constraints, Instrument, MosaicGenerator, ScanGenerator};
use mosaic_geometry::{Illumination, SyntheticGeometry};
use pointing_blocks::{OffsetForm, PointingBlock};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 4, 26, 0, 40, 47).unwrap()
}

fn janus_constraints() -> Constraints {
    let mut c = Constraints::new(Instrument::janus());
    c.stabilization_s = 5.0;
    c.filter_count = 4;
    c
}

fn drift_for_exposure(c: &Constraints, exposure_s: f64) -> f64 {
    c.max_smear_px * c.instrument.pixel_size_rad() / exposure_s
}

#[test]
fn full_disk_mosaic_serializes_as_raster() {
    let c = janus_constraints();
    let geometry = SyntheticGeometry::fixed("CALLISTO", start(), (4.66625 / 2.1_f64).to_radians())
        .with_drift_rate(drift_for_exposure(&c, 13.125));
    let generator = MosaicGenerator::new(&geometry, "CALLISTO", c).unwrap();
    let result = generator.generate(start(), false).unwrap();

    let block = PointingBlock::from_pattern(&result.pattern).unwrap();
    assert!(matches!(block.form, OffsetForm::Raster(_)));
    let text = block.render(3);
    assert!(text.contains("<offsetAngles ref=\"raster\">"));
    assert!(text.contains("<xPoints>3</xPoints>"));
    assert!(text.contains("<yPoints>4</yPoints>"));
    assert!(text.contains("<xDelta units=\"deg\">1.473</xDelta>"));
    assert!(text.contains("<dwellTime units=\"min\">1.208</dwellTime>"));
    // Block brackets the pattern including both delays.
    assert!(text.contains("<startTime>2031-04-26T00:40:47</startTime>"));
    assert!(text.contains("<endTime>2031-04-26T01:06:00</endTime>"));
}

#[test]
fn sunside_mosaic_serializes_as_custom() {
    let c = janus_constraints();
    let geometry = SyntheticGeometry::fixed("CALLISTO", start(), (4.66625 / 2.1_f64).to_radians())
        .with_drift_rate(drift_for_exposure(&c, 13.125))
        .with_illumination(Illumination::half((1.0, 0.0)));
    let generator = MosaicGenerator::new(&geometry, "CALLISTO", c).unwrap();
    let result = generator.generate(start(), true).unwrap();

    let block = PointingBlock::from_pattern(&result.pattern).unwrap();
    let custom = match &block.form {
        OffsetForm::Custom(custom) => custom,
        OffsetForm::Raster(_) => panic!("trimmed mosaics must take the custom form"),
    };
    assert_eq!(custom.delta_times.len(), result.pattern.position_count());
    // Mosaic points hold still while imaging.
    assert!(custom.x_rates.iter().all(|&r| r == 0.0));
    assert!(custom.y_rates.iter().all(|&r| r == 0.0));
    let sum_s: f64 = custom.delta_times.iter().sum::<f64>() * 60.0;
    let expected = result.pattern.duration_s()
        - result.pattern.initial_delay_s
        - result.pattern.final_delay_s;
    assert!((sum_s - expected).abs() < 1e-9);
    assert!(block.render(5).contains("<offsetAngles ref=\"custom\">"));
}

#[test]
fn scan_serializes_as_custom_with_sweep_rates() {
    let mut c = Constraints::new(Instrument::majis());
    c.exposure_ceiling_s = 2.0;
    let geometry = SyntheticGeometry::fixed("GANYMEDE", start(), 2.0_f64.to_radians());
    let generator = ScanGenerator::new(&geometry, "GANYMEDE", c).unwrap();
    let result = generator.generate(start(), false).unwrap();

    let block = PointingBlock::from_pattern(&result.pattern).unwrap();
    let custom = match &block.form {
        OffsetForm::Custom(custom) => custom,
        OffsetForm::Raster(_) => panic!("scans must take the custom form"),
    };
    // Sweeps carry nonzero alternating y rates.
    assert!(custom.y_rates[0] < 0.0);
    assert!(custom.y_rates[1] > 0.0);
    let text = block.render(6);
    assert!(text.contains("<yRates units=\"deg/sec\">"));
    // The offset sequence starts after acquisition plus the border slew.
    assert!(text.contains("\t\t\t<startTime>2031-04-26T00:45:57</startTime>\n"));
}
