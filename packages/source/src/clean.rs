//! Dataset cleaning: column pruning plus optional single-hour filtering.
//!
//! Mirrors the preparation step applied to the raw monthly mobility
//! export before analysis: configured columns are removed, columns with
//! no values at all are removed, and optionally the rows belonging to
//! one target hour are split into their own file.

use std::path::Path;

use chrono::{DateTime, Utc};
use scooter_grid_models::floor_to_hour;

use crate::SourceError;
use crate::parsing::parse_timestamp;

/// What to remove and, optionally, which hour to extract.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Columns to drop regardless of content (e.g. `pricing_plan_id`,
    /// `rental_uris.android`, `rental_uris.ios`).
    pub drop_columns: Vec<String>,
    /// Name of the timestamp column used for hour filtering.
    pub timestamp_column: String,
    /// When set, rows whose timestamp floors to this hour are written
    /// to the hourly output file.
    pub target_hour: Option<DateTime<Utc>>,
}

/// Counts describing what the cleaning pass did.
#[derive(Debug)]
pub struct CleanSummary {
    /// Data rows in the input file.
    pub input_rows: u64,
    /// Header names kept in the cleaned output, in input order.
    pub kept_columns: Vec<String>,
    /// Columns removed because every value was empty.
    pub dropped_empty_columns: Vec<String>,
    /// Rows written to the hourly output, when one was requested.
    pub hourly_rows: Option<u64>,
}

/// Cleans a CSV file and optionally extracts one hour of rows.
///
/// # Errors
///
/// Returns [`SourceError`] if the input cannot be read, an output
/// cannot be written, or hour filtering was requested but the
/// timestamp column is absent.
pub fn clean_csv(
    input: &Path,
    cleaned_output: &Path,
    hourly_output: Option<&Path>,
    options: &CleanOptions,
) -> Result<CleanSummary, SourceError> {
    let mut reader = csv::Reader::from_path(input)?;
    let headers = reader.headers()?.clone();
    let rows = reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, _>>()?;

    // A column survives when it is not explicitly dropped and holds at
    // least one non-empty value.
    let mut kept_indices = Vec::new();
    let mut kept_columns = Vec::new();
    let mut dropped_empty_columns = Vec::new();

    for (idx, header) in headers.iter().enumerate() {
        if options.drop_columns.iter().any(|c| c == header) {
            continue;
        }
        let all_empty = rows
            .iter()
            .all(|row| row.get(idx).is_none_or(|v| v.trim().is_empty()));
        if all_empty {
            dropped_empty_columns.push(header.to_string());
            continue;
        }
        kept_indices.push(idx);
        kept_columns.push(header.to_string());
    }

    write_projection(cleaned_output, &kept_columns, &rows, &kept_indices, None)?;
    log::info!(
        "Cleaned {} rows into {} ({} of {} columns kept)",
        rows.len(),
        cleaned_output.display(),
        kept_columns.len(),
        headers.len()
    );

    let hourly_rows = match (options.target_hour, hourly_output) {
        (Some(target), Some(output)) => {
            let timestamp_idx = headers
                .iter()
                .position(|h| h == options.timestamp_column)
                .ok_or_else(|| SourceError::MissingColumn {
                    column: options.timestamp_column.clone(),
                })?;

            let target = floor_to_hour(target);
            let written = write_projection(
                output,
                &kept_columns,
                &rows,
                &kept_indices,
                Some((timestamp_idx, target)),
            )?;
            log::info!(
                "Found {written} records in hour {target} -> {}",
                output.display()
            );
            Some(written)
        }
        _ => None,
    };

    Ok(CleanSummary {
        input_rows: rows.len() as u64,
        kept_columns,
        dropped_empty_columns,
        hourly_rows,
    })
}

/// Writes the kept columns of each (optionally hour-filtered) row.
fn write_projection(
    output: &Path,
    kept_columns: &[String],
    rows: &[csv::StringRecord],
    kept_indices: &[usize],
    hour_filter: Option<(usize, DateTime<Utc>)>,
) -> Result<u64, SourceError> {
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(kept_columns)?;

    let mut written: u64 = 0;
    for row in rows {
        if let Some((timestamp_idx, target)) = hour_filter {
            let in_hour = row
                .get(timestamp_idx)
                .and_then(parse_timestamp)
                .is_some_and(|ts| floor_to_hour(ts) == target);
            if !in_hour {
                continue;
            }
        }
        writer.write_record(kept_indices.iter().map(|&i| row.get(i).unwrap_or_default()))?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}
