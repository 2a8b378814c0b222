#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Output encoders for aggregation results.
//!
//! Two sinks: self-contained Leaflet HTML maps built from point,
//! rectangle, and polygon primitives, and the CSV tables consumed by
//! downstream analysis. Both take the same `AggregationRecord` stream
//! the aggregation package produces.

pub mod map;
pub mod style;
pub mod table;

pub use map::{MapBuilder, TileLayer};

use thiserror::Error;

/// Errors that can occur while writing output artifacts.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing an output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
