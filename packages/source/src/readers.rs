//! Typed readers for the three tabular inputs.
//!
//! Each reader resolves its required columns by header name up front
//! (missing column = fatal), then maps rows one by one, dropping and
//! counting rows whose fields cannot be extracted.

use std::path::Path;

use scooter_grid_models::{ParkingZone, ScooterObservation, TransportStation};

use crate::SourceError;
use crate::parsing::{parse_lat_lon, parse_timestamp, parse_wkt_point};

/// The outcome of reading one file: the rows that parsed plus the
/// number of rows that were dropped.
#[derive(Debug)]
pub struct ReadSummary<T> {
    /// Successfully parsed records, in file order.
    pub records: Vec<T>,
    /// Rows dropped because a geometry or timestamp field was
    /// malformed or missing.
    pub skipped: u64,
}

/// Resolves a column name to its index in the header row.
fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, SourceError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| SourceError::MissingColumn {
            column: column.to_string(),
        })
}

/// Reads the merged scooter position CSV produced by the fetch loop.
///
/// Requires `geometry` (WKT point) and `timestamp_requested` columns;
/// a `provider` column is used when present.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or a required
/// column is missing.
pub fn read_scooter_csv(path: &Path) -> Result<ReadSummary<ScooterObservation>, SourceError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let geometry_idx = column_index(&headers, "geometry")?;
    let timestamp_idx = column_index(&headers, "timestamp_requested")?;
    let provider_idx = headers.iter().position(|h| h == "provider");

    let mut records = Vec::new();
    let mut skipped: u64 = 0;

    for row in reader.records() {
        let row = row?;

        let point = row.get(geometry_idx).and_then(parse_wkt_point);
        let timestamp = row.get(timestamp_idx).and_then(parse_timestamp);

        let (Some(point), Some(timestamp)) = (point, timestamp) else {
            skipped += 1;
            continue;
        };

        let provider = provider_idx
            .and_then(|i| row.get(i))
            .unwrap_or_default()
            .to_string();

        records.push(ScooterObservation {
            provider,
            timestamp,
            point,
        });
    }

    log::info!(
        "Read {} scooter observations from {} ({skipped} rows dropped)",
        records.len(),
        path.display()
    );

    Ok(ReadSummary { records, skipped })
}

/// Reads the Brussels public transport stations export
/// (semicolon-delimited, `Geo Point` column in `"lat,lon"` order).
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or a required
/// column is missing.
pub fn read_transport_csv(path: &Path) -> Result<ReadSummary<TransportStation>, SourceError> {
    let mut reader = csv::ReaderBuilder::new().delimiter(b';').from_path(path)?;
    let headers = reader.headers()?.clone();

    let point_idx = column_index(&headers, "Geo Point")?;
    let name_idx = column_index(&headers, "Name")?;
    let category_idx = column_index(&headers, "Category")?;

    let mut records = Vec::new();
    let mut skipped: u64 = 0;

    for row in reader.records() {
        let row = row?;

        let Some(point) = row.get(point_idx).and_then(parse_lat_lon) else {
            skipped += 1;
            continue;
        };

        records.push(TransportStation {
            name: row.get(name_idx).unwrap_or_default().to_string(),
            category: row.get(category_idx).unwrap_or_default().to_string(),
            point,
        });
    }

    log::info!(
        "Read {} transport stations from {} ({skipped} rows dropped)",
        records.len(),
        path.display()
    );

    Ok(ReadSummary { records, skipped })
}

/// Reads the scooter parking zones export (`Geographical coordinates`
/// column in `"lat,lon"` order).
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or a required
/// column is missing.
pub fn read_parking_csv(path: &Path) -> Result<ReadSummary<ParkingZone>, SourceError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let coords_idx = column_index(&headers, "Geographical coordinates")?;
    let name_idx = column_index(&headers, "Name")?;
    let status_idx = headers.iter().position(|h| h == "Status");
    let address_idx = headers.iter().position(|h| h == "Address");
    let municipality_idx = headers.iter().position(|h| h == "Municipality");
    let hours_idx = headers.iter().position(|h| h == "Total hour");
    let maps_idx = headers.iter().position(|h| h == "Google Maps");

    let field = |row: &csv::StringRecord, idx: Option<usize>| {
        idx.and_then(|i| row.get(i)).unwrap_or_default().to_string()
    };

    let mut records = Vec::new();
    let mut skipped: u64 = 0;

    for row in reader.records() {
        let row = row?;

        let Some(point) = row.get(coords_idx).and_then(parse_lat_lon) else {
            skipped += 1;
            continue;
        };

        let google_maps_url = maps_idx
            .and_then(|i| row.get(i))
            .filter(|url| !url.is_empty())
            .map(str::to_owned);

        records.push(ParkingZone {
            name: row.get(name_idx).unwrap_or_default().to_string(),
            status: field(&row, status_idx),
            address: field(&row, address_idx),
            municipality: field(&row, municipality_idx),
            total_hours: field(&row, hours_idx),
            google_maps_url,
            point,
        });
    }

    log::info!(
        "Read {} parking zones from {} ({skipped} rows dropped)",
        records.len(),
        path.display()
    );

    Ok(ReadSummary { records, skipped })
}
