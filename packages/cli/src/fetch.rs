//! The `fetch-mobility` and `fetch-weather` commands.

use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use indicatif::{ProgressBar, ProgressStyle};
use scooter_grid_fetch::{
    MobilityClient, MobilityFetchPlan, WeatherFetchPlan, run_mobility_fetch, run_weather_fetch,
};
use scooter_grid_render::table::{write_positions_csv, write_weather_csv};

fn fetch_bar(total: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("  {msg} {wide_bar:.cyan/dim} {pos}/{len} {percent}% [{eta}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    bar.set_message(message.to_string());
    bar
}

/// Polls hourly vehicle position snapshots for every provider over
/// `[start, end)` and writes the merged CSV.
pub async fn fetch_mobility(
    start: NaiveDate,
    end: NaiveDate,
    providers: &str,
    delay_ms: u64,
    api_key: &str,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = MobilityFetchPlan {
        start: start.and_time(NaiveTime::MIN).and_utc(),
        end: end.and_time(NaiveTime::MIN).and_utc(),
        interval: TimeDelta::hours(1),
        providers: providers
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        delay: Duration::from_millis(delay_ms),
    };
    if plan.providers.is_empty() {
        return Err("no providers given".into());
    }

    let client = MobilityClient::new(api_key);
    let bar = fetch_bar(plan.units().len() as u64, "Fetching vehicle positions");
    let collector = run_mobility_fetch(&client, &plan, |done, _total| bar.set_position(done)).await;
    bar.finish_with_message("Vehicle positions fetched");

    write_positions_csv(out, &collector.positions)?;
    println!(
        "Fetched {} positions ({} snapshots failed) -> {}",
        collector.positions.len(),
        collector.failed,
        out.display()
    );
    Ok(())
}

/// Fetches one weather observation per day, sampled at `hour` UTC, and
/// writes the flattened weather CSV.
pub async fn fetch_weather(
    start: NaiveDate,
    days: u32,
    hour: u32,
    delay_ms: u64,
    api_key: &str,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let sample_time = NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| format!("invalid hour of day: {hour}"))?;
    let plan = WeatherFetchPlan {
        start: start.and_time(sample_time).and_utc(),
        days,
        delay: Duration::from_millis(delay_ms),
    };

    let client = MobilityClient::new(api_key);
    let bar = fetch_bar(u64::from(days), "Fetching weather");
    let collector = run_weather_fetch(&client, &plan, |done, _total| bar.set_position(done)).await;
    bar.finish_with_message("Weather fetched");

    write_weather_csv(out, &collector.observations)?;
    println!(
        "Fetched {} weather observations ({} failed) -> {}",
        collector.observations.len(),
        collector.failed,
        out.display()
    );
    Ok(())
}
