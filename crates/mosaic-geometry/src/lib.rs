//! Viewing-Geometry Library
//!
//! Angular/time units, the geometry-provider capability interface used by the
//! mosaic planners, and the 2-D footprint shapes the layout engine works
//! with. Any ephemeris backend can satisfy [`GeometryProvider`]; a synthetic
//! analytic provider is included for tests and planning studies.

use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod provider;
pub mod shape;
pub mod synthetic;
pub mod units;

pub use provider::{FootprintEstimate, GeometryProvider, Illumination};
pub use shape::Rectangle;
pub use synthetic::SyntheticGeometry;
pub use units::{convert_angle, convert_time, AngularUnit, TimeUnit};

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Unknown body: {0}")]
    UnknownBody(String),
    #[error("No geometry coverage for {body} at {time}")]
    CoverageGap { body: String, time: DateTime<Utc> },
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
