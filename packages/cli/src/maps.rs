//! The map-producing commands: `grid-map`, `transport-map`,
//! `parking-demand`, and `municipality-map`.

use std::path::Path;

use chrono::NaiveDate;
use scooter_grid_aggregate::proximity::{bottom_zones, parking_demand as zone_demand, top_zones};
use scooter_grid_aggregate::ranking::{bottom_n, top_n};
use scooter_grid_aggregate::{GroupingOptions, PointSample, aggregate};
use scooter_grid_grid::{cell_bounds, cell_center};
use scooter_grid_models::{
    DemandLevel, DemandThresholds, GeoPoint, GridConfig, ScooterObservation,
};
use scooter_grid_render::style::{category_color, demand_color};
use scooter_grid_render::table::{
    write_grid_demand_csv, write_parking_demand_csv, write_transport_mix_csv,
};
use scooter_grid_render::{MapBuilder, TileLayer};
use scooter_grid_source::readers::{read_parking_csv, read_scooter_csv, read_transport_csv};
use scooter_grid_spatial::MunicipalityIndex;

const BRUSSELS_CENTER: GeoPoint = GeoPoint {
    latitude: 50.8503,
    longitude: 4.3517,
};

/// Half-extents of the rectangle drawn around each parking zone.
const PARKING_LAT_DELTA: f64 = 0.0009;
const PARKING_LON_DELTA: f64 = 0.0014;

fn filter_by_date(
    observations: Vec<ScooterObservation>,
    date: Option<NaiveDate>,
) -> Vec<ScooterObservation> {
    match date {
        Some(date) => observations
            .into_iter()
            .filter(|obs| obs.timestamp.date_naive() == date)
            .collect(),
        None => observations,
    }
}

/// Aggregates scooter positions per cell, prints the demand ranking,
/// and writes the demand table plus a colored rectangle map.
pub fn grid_map(
    scooters: &Path,
    date: Option<NaiveDate>,
    top: usize,
    out_csv: &Path,
    out_map: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let observations = filter_by_date(read_scooter_csv(scooters)?.records, date);
    let config = GridConfig::brussels();
    let records = aggregate(
        observations.iter().map(PointSample::from),
        &config,
        &GroupingOptions::default(),
    );

    println!("High demand zones:");
    for record in top_n(&records, top) {
        let center = cell_center(record.grid_cell, &config);
        println!(
            "  {} (~{:.4}, {:.4}): {} scooters",
            record.grid_cell, center.latitude, center.longitude, record.count
        );
    }
    println!("Low demand zones:");
    for record in bottom_n(&records, top) {
        let center = cell_center(record.grid_cell, &config);
        println!(
            "  {} (~{:.4}, {:.4}): {} scooters",
            record.grid_cell, center.latitude, center.longitude, record.count
        );
    }

    write_grid_demand_csv(out_csv, &records, &config)?;

    let thresholds = DemandThresholds::default();
    let mut map = MapBuilder::new("Scooter demand grid", BRUSSELS_CENTER, 13)
        .with_tiles(TileLayer::CartoDbPositron);
    for record in &records {
        let bounds = cell_bounds(record.grid_cell, &config);
        map.add_rectangle(
            bounds.lat_min,
            bounds.lon_min,
            bounds.lat_max,
            bounds.lon_max,
            demand_color(DemandLevel::classify(record.count, thresholds)),
            0.4,
            Some(format!("{}: {} scooters", record.grid_cell, record.count)),
        );
    }
    map.write_html(out_map)?;
    Ok(())
}

/// Draws the demand grid with the public transport stations on top and
/// writes the combined per-cell table.
pub fn transport_map(
    scooters: &Path,
    stations: &Path,
    date: Option<NaiveDate>,
    out_csv: &Path,
    out_map: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let observations = filter_by_date(read_scooter_csv(scooters)?.records, date);
    let stations = read_transport_csv(stations)?.records;
    let config = GridConfig::brussels();

    let points: Vec<GeoPoint> = observations.iter().map(|obs| obs.point).collect();
    let mix = scooter_grid_aggregate::mix::transport_mix(&points, &stations, &config);
    write_transport_mix_csv(out_csv, &mix, &config)?;

    let thresholds = DemandThresholds::default();
    let mut map = MapBuilder::new("Scooter demand and public transport", BRUSSELS_CENTER, 12)
        .with_tiles(TileLayer::CartoDbPositron);
    for row in &mix.rows {
        let bounds = cell_bounds(row.cell, &config);
        map.add_rectangle(
            bounds.lat_min,
            bounds.lon_min,
            bounds.lat_max,
            bounds.lon_max,
            demand_color(DemandLevel::classify(row.scooter_count, thresholds)),
            0.4,
            Some(format!("{}: {} scooters", row.cell, row.scooter_count)),
        );
    }
    for station in &stations {
        map.add_circle_marker(
            station.point,
            4,
            category_color(&station.category),
            0.7,
            Some(format!("{} ({})", station.name, station.category)),
        );
    }
    map.write_html(out_map)?;
    Ok(())
}

/// Counts scooters near every parking zone, prints the busiest and
/// quietest zones, and draws the zone rectangles colored by demand.
pub fn parking_demand(
    parking: &Path,
    scooters: &Path,
    date: Option<NaiveDate>,
    radius_meters: f64,
    top: usize,
    out_csv: Option<&Path>,
    out_map: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let zones = read_parking_csv(parking)?.records;
    let observations = filter_by_date(read_scooter_csv(scooters)?.records, date);
    let points: Vec<GeoPoint> = observations.iter().map(|obs| obs.point).collect();

    let demand = zone_demand(&zones, &points, radius_meters);

    println!("Busiest parking zones (within {radius_meters}m):");
    for entry in top_zones(&demand, top) {
        println!("  {}: {} scooters", entry.zone.name, entry.scooter_count);
    }
    println!("Quietest parking zones:");
    for entry in bottom_zones(&demand, top) {
        println!("  {}: {} scooters", entry.zone.name, entry.scooter_count);
    }

    if let Some(out_csv) = out_csv {
        write_parking_demand_csv(out_csv, &demand)?;
    }

    let thresholds = DemandThresholds::default();
    let mut map = MapBuilder::new("Parking zone demand", BRUSSELS_CENTER, 13);
    for entry in &demand {
        let mut popup = format!(
            "<b>{}</b><br>Status: {}<br>Address: {}<br>Municipality: {}<br>Hours: {}<br>Scooters nearby: {}",
            entry.zone.name,
            entry.zone.status,
            entry.zone.address,
            entry.zone.municipality,
            entry.zone.total_hours,
            entry.scooter_count
        );
        if let Some(url) = &entry.zone.google_maps_url {
            popup.push_str(&format!("<br><a href=\"{url}\">Google Maps</a>"));
        }
        map.add_rectangle(
            entry.zone.point.latitude - PARKING_LAT_DELTA,
            entry.zone.point.longitude - PARKING_LON_DELTA,
            entry.zone.point.latitude + PARKING_LAT_DELTA,
            entry.zone.point.longitude + PARKING_LON_DELTA,
            demand_color(DemandLevel::classify(entry.scooter_count, thresholds)),
            0.5,
            Some(popup),
        );
    }
    map.write_html(out_map)?;
    Ok(())
}

/// Draws the municipality boundaries with a name popup per polygon.
pub fn municipality_map(
    municipalities: &Path,
    name_property: &str,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    // Building the index validates the file and logs how many
    // boundaries it holds.
    let index = MunicipalityIndex::from_geojson_file(municipalities, name_property)?;
    if index.is_empty() {
        log::warn!("No usable boundaries in {}", municipalities.display());
    }

    let geojson = std::fs::read_to_string(municipalities)?;
    let mut map = MapBuilder::new("Brussels municipalities", BRUSSELS_CENTER, 12);
    map.add_geojson_layer(geojson, "blue", "black", 1, 0.5, Some(name_property.to_string()));
    map.write_html(out)?;
    Ok(())
}
