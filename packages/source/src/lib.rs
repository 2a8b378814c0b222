#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV ingestion for the mobility datasets.
//!
//! Each reader maps one source file layout (scooter positions, public
//! transport stations, parking zones) to the shared record types.
//! Rows whose geometry or timestamp fields cannot be extracted are
//! dropped and counted, never coerced to sentinel coordinates; a
//! missing input file or required column is a fatal error because no
//! meaningful output can be produced without it.

pub mod clean;
pub mod parsing;
pub mod readers;

use thiserror::Error;

/// Errors that can occur while reading source data.
#[derive(Debug, Error)]
pub enum SourceError {
    /// I/O error (file open/read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed at the file level.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the file's header row.
    #[error("required column '{column}' is missing")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },
}
