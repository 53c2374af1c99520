//! Plan a refined full-disk JANUS mosaic over a synthetic flyby.
//!
//! Run with: cargo run --example plan_full_disk

use chrono::{TimeZone, Utc};
use mosaic_engine::{Constraints, Instrument, MosaicGenerator, RefineOptions};
use mosaic_geometry::SyntheticGeometry;

fn main() -> mosaic_engine::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let start = Utc.with_ymd_and_hms(2031, 4, 26, 0, 40, 47).unwrap();

    let mut constraints = Constraints::new(Instrument::janus());
    constraints.stabilization_s = 5.0;
    constraints.filter_count = 4;

    // Approaching flyby: the disk grows during the observation, so the
    // refiner has to widen the margin.
    let drift = constraints.max_smear_px * constraints.instrument.pixel_size_rad() / 13.125;
    let geometry = SyntheticGeometry::fixed("CALLISTO", start, 2.2_f64.to_radians())
        .with_drift_rate(drift)
        .with_range_rate(-5.0);

    let generator = MosaicGenerator::new(&geometry, "CALLISTO", constraints)?;
    let result = generator.generate_refined(start, false, &RefineOptions::default())?;

    println!("{}", result.report(generator.constraints()));
    Ok(())
}
