//! PTR pointing-block serialization.
//!
//! Turns a planned pointing pattern into the observation block of a PTR
//! timeline: a `track`-attitude block whose offset sequence is either the
//! compact raster form (full untrimmed grids) or the explicit per-point
//! custom form (trimmed mosaics and continuous scans). The choice is
//! structural, made once from the pattern's kind rather than re-derived
//! from its geometry.

use thiserror::Error;

mod block;

pub use block::{CustomBlock, OffsetForm, PointingBlock, RasterBlock};

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Pattern for {0} has no points to serialize")]
    EmptyPattern(String),
}

pub type Result<T> = std::result::Result<T, BlockError>;
