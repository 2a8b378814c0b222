#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data types for the scooter grid analysis toolchain.
//!
//! Every pipeline stage (ingestion, grid binning, municipality join,
//! aggregation, rendering) exchanges these types. They carry no behavior
//! beyond construction and formatting; the algorithms live in the
//! `scooter_grid_grid`, `scooter_grid_spatial`, and
//! `scooter_grid_aggregate` packages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A geographic position in WGS84 coordinates.
///
/// Immutable once constructed. Records whose location field cannot be
/// parsed are dropped upstream rather than defaulted to `(0, 0)`, so a
/// `GeoPoint` always represents a real observed position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, in `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in degrees, in `[-180, 180]`.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point if both coordinates are finite and within the
    /// WGS84 bounds; returns `None` otherwise.
    #[must_use]
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}

/// Integer grid coordinates relative to a [`GridConfig`] origin.
///
/// Two points map to the same cell iff their floored row/col indices
/// match. Row `0` starts at the origin latitude and grows northward;
/// negative rows lie south of the origin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridCell {
    /// Latitude index (floored steps north of the origin).
    pub row: i32,
    /// Longitude index (floored steps east of the origin).
    pub col: i32,
}

impl std::fmt::Display for GridCell {
    /// Formats the stable textual cell identifier used in CSV output,
    /// e.g. `Grid: (3, -2)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid: ({}, {})", self.row, self.col)
    }
}

/// Defines a uniform equirectangular grid: an origin corner plus fixed
/// step sizes in degrees.
///
/// Constructed once per run and passed explicitly to every grid
/// operation, so grids for different cities can coexist in one process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Latitude of cell `(0, 0)`'s southern edge.
    pub origin_lat: f64,
    /// Longitude of cell `(0, 0)`'s western edge.
    pub origin_lon: f64,
    /// Cell height in degrees of latitude.
    pub lat_step: f64,
    /// Cell width in degrees of longitude.
    pub lon_step: f64,
}

/// Meters of latitude per degree (spherical approximation).
const METERS_PER_DEGREE: f64 = 111_000.0;

impl GridConfig {
    /// The Brussels reference grid: 250 m cells anchored south-west of
    /// the city center.
    #[must_use]
    pub const fn brussels() -> Self {
        Self {
            origin_lat: 50.7964,
            origin_lon: 4.3124,
            lat_step: 0.002_247,
            lon_step: 0.003_561,
        }
    }

    /// Derives step sizes approximating `cell_meters` per cell edge at
    /// the given origin. The longitude step is widened by
    /// `1 / cos(origin_lat)` so cells stay roughly square on the ground.
    #[must_use]
    pub fn from_cell_meters(origin_lat: f64, origin_lon: f64, cell_meters: f64) -> Self {
        Self {
            origin_lat,
            origin_lon,
            lat_step: cell_meters / METERS_PER_DEGREE,
            lon_step: cell_meters / (METERS_PER_DEGREE * origin_lat.to_radians().cos()),
        }
    }
}

/// Public transport station categories found in the Brussels open data
/// export. The source CSV spells the metro category `Métro`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum TransportCategory {
    /// Bus stop.
    Bus,
    /// Tram stop.
    Tram,
    /// Metro station.
    #[strum(serialize = "Métro")]
    #[serde(rename = "Métro")]
    Metro,
}

/// A single scooter position observation from the merged mobility CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScooterObservation {
    /// Operator that reported the vehicle (e.g. `"lime"`, `"dott"`).
    pub provider: String,
    /// The timestamp the position snapshot was requested for.
    pub timestamp: DateTime<Utc>,
    /// The vehicle position.
    pub point: GeoPoint,
}

/// A public transport station from the Brussels open data export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportStation {
    /// Station name.
    pub name: String,
    /// Raw category string from the source (`Bus`, `Tram`, `Métro`, ...).
    /// Kept verbatim so unknown categories still aggregate.
    pub category: String,
    /// Station position.
    pub point: GeoPoint,
}

/// A designated scooter parking zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingZone {
    /// Zone name.
    pub name: String,
    /// Operational status (e.g. `"Active"`).
    pub status: String,
    /// Street address.
    pub address: String,
    /// Municipality the zone belongs to, per the source data.
    pub municipality: String,
    /// Opening-hours description from the source.
    pub total_hours: String,
    /// Link to the zone on Google Maps, if present.
    pub google_maps_url: Option<String>,
    /// Zone position.
    pub point: GeoPoint,
}

/// One flattened weather observation from the Mobility Twin weather
/// endpoint. Field names match the CSV schema of the fetch output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Local date and time of the observation (`YYYY-MM-DD HH:MM`).
    pub date: String,
    pub lat: f64,
    pub lon: f64,
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
    /// Coarse condition (e.g. `"Clouds"`).
    pub weather_main: String,
    /// Human-readable condition description.
    pub weather_desc: String,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub clouds_all: f64,
    pub visibility: f64,
    /// Sunrise time (`HH:MM`).
    pub sunrise: String,
    /// Sunset time (`HH:MM`).
    pub sunset: String,
}

/// One row of the sparse aggregation output: a grid cell plus the
/// optional grouping dimensions that were requested, and the number of
/// input points sharing that key.
///
/// Records are only materialized for keys with at least one match, so
/// `count >= 1` by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRecord {
    /// The grid cell all grouped points fall into.
    pub grid_cell: GridCell,
    /// Hour bucket (timestamp floored to the hour), when hourly
    /// grouping was requested.
    pub time_bucket: Option<DateTime<Utc>>,
    /// Category dimension, when category grouping was requested.
    pub category: Option<String>,
    /// Municipality containing the cell center, when the polygon join
    /// was requested. Empty string when the center falls outside every
    /// polygon.
    pub municipality: Option<String>,
    /// Number of input points sharing this key.
    pub count: u64,
}

/// Truncates a timestamp to the top of its containing hour.
///
/// Uses euclidean division on the unix timestamp so pre-epoch times
/// floor toward earlier hours rather than toward zero.
#[must_use]
pub fn floor_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let floored = timestamp.timestamp().div_euclid(3600) * 3600;
    DateTime::<Utc>::from_timestamp(floored, 0).unwrap_or(timestamp)
}

/// Count boundaries separating low, medium, and high demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandThresholds {
    /// Counts at or above this are high demand.
    pub high: u64,
    /// Counts at or above this (but below `high`) are medium demand.
    pub medium: u64,
}

impl Default for DemandThresholds {
    /// The reference policy: `>= 100` high, `>= 50` medium.
    fn default() -> Self {
        Self {
            high: 100,
            medium: 50,
        }
    }
}

/// Demand classification of a count against [`DemandThresholds`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    /// At or above the high threshold.
    High,
    /// At or above the medium threshold.
    Medium,
    /// Below the medium threshold but non-zero.
    Low,
    /// Zero observations.
    None,
}

impl DemandLevel {
    /// Classifies a count against the given thresholds.
    #[must_use]
    pub const fn classify(count: u64, thresholds: DemandThresholds) -> Self {
        if count >= thresholds.high {
            Self::High
        } else if count >= thresholds.medium {
            Self::Medium
        } else if count > 0 {
            Self::Low
        } else {
            Self::None
        }
    }
}
