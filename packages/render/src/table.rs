//! CSV writers for the aggregation outputs.
//!
//! Column layouts match the reference exports so downstream notebooks
//! keep working: `grid_id` is the stable `Grid: (row, col)` encoding,
//! `hour` is `YYYY-MM-DD HH:MM:SS`, and a cell outside every
//! municipality gets an empty `municipality` value.

use std::path::Path;

use scooter_grid_aggregate::mix::TransportMix;
use scooter_grid_aggregate::proximity::ZoneDemand;
use scooter_grid_grid::cell_center;
use scooter_grid_models::{
    AggregationRecord, GridConfig, ScooterObservation, WeatherObservation,
};

use crate::RenderError;

/// Writes the hourly per-cell counts with municipality attribution:
/// `grid_id,hour,municipality,scooter_count`.
///
/// # Errors
///
/// Returns [`RenderError`] if the file cannot be written.
pub fn write_hourly_municipality_csv(
    path: &Path,
    records: &[AggregationRecord],
) -> Result<(), RenderError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["grid_id", "hour", "municipality", "scooter_count"])?;

    for record in records {
        let hour = record
            .time_bucket
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        writer.write_record([
            record.grid_cell.to_string(),
            hour,
            record.municipality.clone().unwrap_or_default(),
            record.count.to_string(),
        ])?;
    }

    writer.flush()?;
    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Writes the per-cell demand table with approximate cell centers:
/// `grid_row,grid_col,count,approx_lat,approx_lon`.
///
/// # Errors
///
/// Returns [`RenderError`] if the file cannot be written.
pub fn write_grid_demand_csv(
    path: &Path,
    records: &[AggregationRecord],
    config: &GridConfig,
) -> Result<(), RenderError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["grid_row", "grid_col", "count", "approx_lat", "approx_lon"])?;

    for record in records {
        let center = cell_center(record.grid_cell, config);
        writer.write_record([
            record.grid_cell.row.to_string(),
            record.grid_cell.col.to_string(),
            record.count.to_string(),
            format!("{:.6}", center.latitude),
            format!("{:.6}", center.longitude),
        ])?;
    }

    writer.flush()?;
    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Writes the combined scooter/transport table. Fixed columns first,
/// then one column per station category in sorted order.
///
/// # Errors
///
/// Returns [`RenderError`] if the file cannot be written.
pub fn write_transport_mix_csv(
    path: &Path,
    mix: &TransportMix,
    config: &GridConfig,
) -> Result<(), RenderError> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![
        "grid_row".to_string(),
        "grid_col".to_string(),
        "count".to_string(),
        "approx_lat".to_string(),
        "approx_lon".to_string(),
    ];
    header.extend(mix.categories.iter().cloned());
    writer.write_record(&header)?;

    for row in &mix.rows {
        let center = cell_center(row.cell, config);
        let mut fields = vec![
            row.cell.row.to_string(),
            row.cell.col.to_string(),
            row.scooter_count.to_string(),
            format!("{:.6}", center.latitude),
            format!("{:.6}", center.longitude),
        ];
        for category in &mix.categories {
            fields.push(row.stations.get(category).copied().unwrap_or(0).to_string());
        }
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    log::info!("Wrote {} rows to {}", mix.rows.len(), path.display());
    Ok(())
}

/// Writes per-zone proximity counts:
/// `name,address,municipality,scooter_count`.
///
/// # Errors
///
/// Returns [`RenderError`] if the file cannot be written.
pub fn write_parking_demand_csv(path: &Path, demand: &[ZoneDemand]) -> Result<(), RenderError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["name", "address", "municipality", "scooter_count"])?;

    for entry in demand {
        writer.write_record([
            entry.zone.name.clone(),
            entry.zone.address.clone(),
            entry.zone.municipality.clone(),
            entry.scooter_count.to_string(),
        ])?;
    }

    writer.flush()?;
    log::info!("Wrote {} rows to {}", demand.len(), path.display());
    Ok(())
}

/// Writes the merged vehicle position snapshot CSV consumed by the
/// analysis commands: `provider,timestamp_requested,geometry`.
///
/// # Errors
///
/// Returns [`RenderError`] if the file cannot be written.
pub fn write_positions_csv(
    path: &Path,
    positions: &[ScooterObservation],
) -> Result<(), RenderError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["provider", "timestamp_requested", "geometry"])?;

    for obs in positions {
        writer.write_record([
            obs.provider.clone(),
            obs.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            format!("POINT ({} {})", obs.point.longitude, obs.point.latitude),
        ])?;
    }

    writer.flush()?;
    log::info!("Wrote {} positions to {}", positions.len(), path.display());
    Ok(())
}

/// Writes daily weather observations with the flattened schema.
///
/// # Errors
///
/// Returns [`RenderError`] if the file cannot be written.
pub fn write_weather_csv(
    path: &Path,
    observations: &[WeatherObservation],
) -> Result<(), RenderError> {
    let mut writer = csv::Writer::from_path(path)?;
    for obs in observations {
        writer.serialize(obs)?;
    }
    writer.flush()?;
    log::info!(
        "Wrote {} observations to {}",
        observations.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use chrono::Utc;
    use scooter_grid_models::{GeoPoint, GridCell};

    #[test]
    fn hourly_csv_has_reference_columns_and_encoding() {
        let records = vec![AggregationRecord {
            grid_cell: GridCell { row: 2, col: 5 },
            time_bucket: Some(Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()),
            category: None,
            municipality: Some("Ixelles".to_string()),
            count: 12,
        }];
        let path = std::env::temp_dir().join("scooter_grid_render_hourly.csv");

        write_hourly_municipality_csv(&path, &records).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(written.starts_with("grid_id,hour,municipality,scooter_count\n"));
        assert!(written.contains("\"Grid: (2, 5)\",2024-09-01 08:00:00,Ixelles,12"));
    }

    #[test]
    fn empty_municipality_serializes_as_empty_field() {
        let records = vec![AggregationRecord {
            grid_cell: GridCell { row: 0, col: 0 },
            time_bucket: Some(Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()),
            category: None,
            municipality: Some(String::new()),
            count: 1,
        }];
        let path = std::env::temp_dir().join("scooter_grid_render_empty_muni.csv");

        write_hourly_municipality_csv(&path, &records).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(written.contains("2024-09-01 08:00:00,,1"));
    }

    #[test]
    fn positions_csv_round_trips_through_the_wkt_parser() {
        let positions = vec![ScooterObservation {
            provider: "lime".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap(),
            point: GeoPoint {
                latitude: 50.8503,
                longitude: 4.3517,
            },
        }];
        let path = std::env::temp_dir().join("scooter_grid_render_positions.csv");

        write_positions_csv(&path, &positions).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(written.contains("lime,2024-09-01T08:00:00,POINT (4.3517 50.8503)"));
    }
}
