//! The `clean`, `hourly-grid`, and `usage-profile` commands.

use std::path::Path;

use scooter_grid_aggregate::profile::{usage_profile as build_profile, weekend_split_by_cell};
use scooter_grid_aggregate::{GroupingOptions, PointSample, aggregate, total_count};
use scooter_grid_grid::cell_center;
use scooter_grid_models::GridConfig;
use scooter_grid_render::table::write_hourly_municipality_csv;
use scooter_grid_source::clean::{CleanOptions, clean_csv};
use scooter_grid_source::parsing::parse_timestamp;
use scooter_grid_source::readers::read_scooter_csv;
use scooter_grid_spatial::MunicipalityIndex;

/// Runs the cleaning pass: drops configured and all-empty columns, and
/// optionally extracts one hour of rows into a second file.
pub fn clean(
    input: &Path,
    cleaned_out: &Path,
    hourly_out: Option<&Path>,
    target_hour: Option<&str>,
    drop_columns: &str,
    timestamp_column: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let target_hour = match target_hour {
        Some(raw) => Some(
            parse_timestamp(raw).ok_or_else(|| format!("unparseable target hour: {raw}"))?,
        ),
        None => None,
    };
    if hourly_out.is_some() != target_hour.is_some() {
        return Err("--hourly-out and --target-hour must be given together".into());
    }

    let options = CleanOptions {
        drop_columns: drop_columns
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        timestamp_column,
        target_hour,
    };

    let summary = clean_csv(input, cleaned_out, hourly_out, &options)?;
    println!(
        "Cleaned {} rows: kept {} columns, dropped {} empty",
        summary.input_rows,
        summary.kept_columns.len(),
        summary.dropped_empty_columns.len()
    );
    if let Some(rows) = summary.hourly_rows {
        println!("Extracted {rows} rows for the target hour");
    }
    Ok(())
}

/// Aggregates the scooter positions per cell and hour, joins each cell
/// against the municipality boundaries, and writes the result table.
pub fn hourly_grid(
    scooters: &Path,
    municipalities: &Path,
    name_property: &str,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let index = MunicipalityIndex::from_geojson_file(municipalities, name_property)?;
    let summary = read_scooter_csv(scooters)?;

    let config = GridConfig::brussels();
    let records = aggregate(
        summary.records.iter().map(PointSample::from),
        &config,
        &GroupingOptions {
            by_hour: true,
            by_category: false,
            municipalities: Some(&index),
        },
    );

    write_hourly_municipality_csv(out, &records)?;
    println!(
        "Aggregated {} observations into {} cell-hour rows -> {}",
        total_count(&records),
        records.len(),
        out.display()
    );
    Ok(())
}

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Prints usage statistics: observations by hour of day and weekday,
/// the weekend/weekday balance, and the cells most skewed toward
/// weekend or weekday use.
pub fn usage_profile(scooters: &Path, top: usize) -> Result<(), Box<dyn std::error::Error>> {
    let summary = read_scooter_csv(scooters)?;
    let profile = build_profile(summary.records.iter().map(|obs| obs.timestamp));

    println!("Observations by hour of day:");
    for (hour, count) in profile.by_hour_of_day.iter().enumerate() {
        println!("  {hour:>2}:00  {count}");
    }

    println!("Observations by weekday:");
    for (name, count) in WEEKDAY_NAMES.iter().zip(profile.by_weekday.iter()) {
        println!("  {name:<9} {count}");
    }

    println!(
        "Weekday total: {} / Weekend total: {}",
        profile.weekday_total, profile.weekend_total
    );

    let config = GridConfig::brussels();
    let mut splits = weekend_split_by_cell(&summary.records, &config);
    splits.sort_by(|a, b| {
        b.ratio
            .partial_cmp(&a.ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cell.cmp(&b.cell))
    });

    println!("Most weekend-skewed cells:");
    for split in splits.iter().take(top) {
        let center = cell_center(split.cell, &config);
        println!(
            "  {} (~{:.4}, {:.4}): weekend {} / weekday {} (ratio {:.2})",
            split.cell, center.latitude, center.longitude, split.weekend, split.weekday, split.ratio
        );
    }

    println!("Most weekday-skewed cells:");
    for split in splits.iter().rev().take(top) {
        let center = cell_center(split.cell, &config);
        println!(
            "  {} (~{:.4}, {:.4}): weekend {} / weekday {} (ratio {:.2})",
            split.cell, center.latitude, center.longitude, split.weekend, split.weekday, split.ratio
        );
    }

    Ok(())
}
