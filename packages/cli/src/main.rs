#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the scooter grid analysis toolchain.
//!
//! One subcommand per pipeline stage: fetching raw data from the
//! Mobility Twin API, cleaning the merged CSV, and the aggregation /
//! map commands that turn scooter positions into demand tables and
//! interactive maps.

mod analyze;
mod fetch;
mod maps;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scooter_grid", about = "Brussels micromobility grid analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll hourly vehicle positions for a date range and write the
    /// merged position CSV
    FetchMobility {
        /// First day to fetch (inclusive), `YYYY-MM-DD`
        #[arg(long)]
        start: NaiveDate,
        /// End of the range (exclusive), `YYYY-MM-DD`
        #[arg(long)]
        end: NaiveDate,
        /// Comma-separated provider list
        #[arg(long, default_value = "lime,dott,pony,bolt")]
        providers: String,
        /// Pause between timestamps, in milliseconds
        #[arg(long, default_value = "1000")]
        delay_ms: u64,
        /// API key (falls back to the `MOBILITY_TWIN_API_KEY` env var)
        #[arg(long)]
        api_key: Option<String>,
        /// Output CSV path
        #[arg(long)]
        out: PathBuf,
    },
    /// Fetch one weather observation per day and write the weather CSV
    FetchWeather {
        /// First day to fetch, `YYYY-MM-DD`
        #[arg(long)]
        start: NaiveDate,
        /// Number of days to fetch
        #[arg(long, default_value = "30")]
        days: u32,
        /// Hour of day (UTC) to sample
        #[arg(long, default_value = "11")]
        hour: u32,
        /// Pause between requests, in milliseconds
        #[arg(long, default_value = "1000")]
        delay_ms: u64,
        /// API key (falls back to the `MOBILITY_TWIN_API_KEY` env var)
        #[arg(long)]
        api_key: Option<String>,
        /// Output CSV path
        #[arg(long)]
        out: PathBuf,
    },
    /// Drop unwanted/empty columns and optionally extract one hour
    Clean {
        /// Input CSV
        #[arg(long)]
        input: PathBuf,
        /// Cleaned output CSV
        #[arg(long)]
        cleaned_out: PathBuf,
        /// Hourly output CSV (requires `--target-hour`)
        #[arg(long)]
        hourly_out: Option<PathBuf>,
        /// Hour to extract, e.g. `2024-09-01T00:00:00`
        #[arg(long)]
        target_hour: Option<String>,
        /// Comma-separated list of columns to drop
        #[arg(long, default_value = "pricing_plan_id,rental_uris.android,rental_uris.ios")]
        drop_columns: String,
        /// Timestamp column used for hour filtering
        #[arg(long, default_value = "timestamp_requested")]
        timestamp_column: String,
    },
    /// Hourly per-cell scooter counts with municipality attribution
    HourlyGrid {
        /// Merged scooter position CSV
        #[arg(long)]
        scooters: PathBuf,
        /// Municipality boundaries GeoJSON
        #[arg(long)]
        municipalities: PathBuf,
        /// Feature property holding the municipality name
        #[arg(long, default_value = "name_fr")]
        name_property: String,
        /// Output CSV path
        #[arg(long)]
        out: PathBuf,
    },
    /// Print hour-of-day / weekday usage statistics for a month of data
    UsageProfile {
        /// Merged scooter position CSV
        #[arg(long)]
        scooters: PathBuf,
        /// How many weekend/weekday-dominant cells to list
        #[arg(long, default_value = "10")]
        top: usize,
    },
    /// Per-cell demand grid: ranked zones, CSV table, and rectangle map
    GridMap {
        /// Merged scooter position CSV
        #[arg(long)]
        scooters: PathBuf,
        /// Only analyze observations from this day, `YYYY-MM-DD`
        #[arg(long)]
        date: Option<NaiveDate>,
        /// How many high/low demand zones to print
        #[arg(long, default_value = "10")]
        top: usize,
        /// Output CSV path
        #[arg(long)]
        out_csv: PathBuf,
        /// Output HTML map path
        #[arg(long)]
        out_map: PathBuf,
    },
    /// Demand grid overlaid with public transport stations
    TransportMap {
        /// Merged scooter position CSV
        #[arg(long)]
        scooters: PathBuf,
        /// Public transport stations CSV (semicolon-delimited)
        #[arg(long)]
        stations: PathBuf,
        /// Only analyze observations from this day, `YYYY-MM-DD`
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output CSV path for the combined per-cell table
        #[arg(long)]
        out_csv: PathBuf,
        /// Output HTML map path
        #[arg(long)]
        out_map: PathBuf,
    },
    /// Scooter counts around parking zones, with demand ranking
    ParkingDemand {
        /// Parking zones CSV
        #[arg(long)]
        parking: PathBuf,
        /// Merged scooter position CSV
        #[arg(long)]
        scooters: PathBuf,
        /// Only count observations from this day, `YYYY-MM-DD`
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Count scooters within this distance of each zone
        #[arg(long, default_value = "100")]
        radius_meters: f64,
        /// How many high/low demand zones to print
        #[arg(long, default_value = "9")]
        top: usize,
        /// Optional output CSV with per-zone counts
        #[arg(long)]
        out_csv: Option<PathBuf>,
        /// Output HTML map path
        #[arg(long)]
        out_map: PathBuf,
    },
    /// Plain municipality boundary map
    MunicipalityMap {
        /// Municipality boundaries GeoJSON
        #[arg(long)]
        municipalities: PathBuf,
        /// Feature property holding the municipality name
        #[arg(long, default_value = "name_fr")]
        name_property: String,
        /// Output HTML map path
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::FetchMobility {
            start,
            end,
            providers,
            delay_ms,
            api_key,
            out,
        } => {
            let api_key = resolve_api_key(api_key)?;
            fetch::fetch_mobility(start, end, &providers, delay_ms, &api_key, &out).await?;
        }
        Commands::FetchWeather {
            start,
            days,
            hour,
            delay_ms,
            api_key,
            out,
        } => {
            let api_key = resolve_api_key(api_key)?;
            fetch::fetch_weather(start, days, hour, delay_ms, &api_key, &out).await?;
        }
        Commands::Clean {
            input,
            cleaned_out,
            hourly_out,
            target_hour,
            drop_columns,
            timestamp_column,
        } => analyze::clean(
            &input,
            &cleaned_out,
            hourly_out.as_deref(),
            target_hour.as_deref(),
            &drop_columns,
            timestamp_column,
        )?,
        Commands::HourlyGrid {
            scooters,
            municipalities,
            name_property,
            out,
        } => analyze::hourly_grid(&scooters, &municipalities, &name_property, &out)?,
        Commands::UsageProfile { scooters, top } => analyze::usage_profile(&scooters, top)?,
        Commands::GridMap {
            scooters,
            date,
            top,
            out_csv,
            out_map,
        } => maps::grid_map(&scooters, date, top, &out_csv, &out_map)?,
        Commands::TransportMap {
            scooters,
            stations,
            date,
            out_csv,
            out_map,
        } => maps::transport_map(&scooters, &stations, date, &out_csv, &out_map)?,
        Commands::ParkingDemand {
            parking,
            scooters,
            date,
            radius_meters,
            top,
            out_csv,
            out_map,
        } => maps::parking_demand(
            &parking,
            &scooters,
            date,
            radius_meters,
            top,
            out_csv.as_deref(),
            &out_map,
        )?,
        Commands::MunicipalityMap {
            municipalities,
            name_property,
            out,
        } => maps::municipality_map(&municipalities, &name_property, &out)?,
    }

    Ok(())
}

/// Resolves the API key from the flag or the environment. Missing key
/// is a configuration error: no request can succeed without it.
fn resolve_api_key(flag: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(key) = flag {
        return Ok(key);
    }
    std::env::var("MOBILITY_TWIN_API_KEY")
        .map_err(|_| "no API key: pass --api-key or set MOBILITY_TWIN_API_KEY".into())
}
