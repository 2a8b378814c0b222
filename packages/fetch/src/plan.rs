//! Fetch schedules and collectors.
//!
//! A plan expands to a flat list of fetch units (one provider at one
//! timestamp). The run functions walk the units in order, handing each
//! result to a collector; the collector accumulates successes and logs
//! failures so one bad unit never aborts the loop.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use scooter_grid_models::{ScooterObservation, WeatherObservation};

use crate::{FetchError, MobilityClient};

/// One unit of fetch work: a provider snapshot at one timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchUnit {
    /// Provider identifier (e.g. `"lime"`).
    pub provider: String,
    /// Snapshot timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Schedule for polling vehicle positions over a time range.
#[derive(Debug, Clone)]
pub struct MobilityFetchPlan {
    /// First snapshot timestamp (inclusive).
    pub start: DateTime<Utc>,
    /// End of the range (exclusive).
    pub end: DateTime<Utc>,
    /// Spacing between snapshots (one hour in the reference runs).
    pub interval: TimeDelta,
    /// Providers to poll at every timestamp.
    pub providers: Vec<String>,
    /// Pause after each timestamp's batch of providers.
    pub delay: Duration,
}

impl MobilityFetchPlan {
    /// Expands the plan into units, timestamp-major: all providers at
    /// the first timestamp, then all providers at the next, and so on.
    #[must_use]
    pub fn units(&self) -> Vec<FetchUnit> {
        let mut units = Vec::new();
        let mut current = self.start;
        while current < self.end {
            for provider in &self.providers {
                units.push(FetchUnit {
                    provider: provider.clone(),
                    timestamp: current,
                });
            }
            current += self.interval;
        }
        units
    }
}

/// Accumulates vehicle position snapshots, skipping failed units.
#[derive(Debug, Default)]
pub struct PositionCollector {
    /// All positions from successful units, in fetch order.
    pub positions: Vec<ScooterObservation>,
    /// Units that succeeded (possibly with zero vehicles).
    pub succeeded: u64,
    /// Units that failed and were skipped.
    pub failed: u64,
}

impl PositionCollector {
    /// Records one unit's outcome. Failures are logged and counted,
    /// never propagated.
    pub fn absorb(&mut self, unit: &FetchUnit, result: Result<Vec<ScooterObservation>, FetchError>) {
        match result {
            Ok(positions) => {
                log::debug!(
                    "[{}] {} vehicles at {}",
                    unit.provider,
                    positions.len(),
                    unit.timestamp
                );
                self.succeeded += 1;
                self.positions.extend(positions);
            }
            Err(error) => {
                log::error!(
                    "[{}] Fetch failed at {}: {error}",
                    unit.provider,
                    unit.timestamp
                );
                self.failed += 1;
            }
        }
    }
}

/// Polls vehicle positions for the whole plan, strictly sequentially,
/// sleeping `plan.delay` after each timestamp.
///
/// `on_unit_done` is called after every unit with (done, total), for
/// progress reporting.
pub async fn run_mobility_fetch(
    client: &MobilityClient,
    plan: &MobilityFetchPlan,
    mut on_unit_done: impl FnMut(u64, u64),
) -> PositionCollector {
    let units = plan.units();
    let total = units.len() as u64;
    let per_timestamp = plan.providers.len().max(1);

    let mut collector = PositionCollector::default();

    for (i, unit) in units.iter().enumerate() {
        let result = client.vehicle_positions(&unit.provider, unit.timestamp).await;
        collector.absorb(unit, result);
        on_unit_done(i as u64 + 1, total);

        // Pause between timestamps, not between providers.
        let timestamp_finished = (i + 1) % per_timestamp == 0;
        if timestamp_finished && i + 1 < units.len() {
            tokio::time::sleep(plan.delay).await;
        }
    }

    log::info!(
        "Mobility fetch complete: {} positions from {} units ({} failed)",
        collector.positions.len(),
        collector.succeeded,
        collector.failed
    );

    collector
}

/// Schedule for daily weather observations.
#[derive(Debug, Clone)]
pub struct WeatherFetchPlan {
    /// First observation timestamp.
    pub start: DateTime<Utc>,
    /// Number of daily observations to fetch.
    pub days: u32,
    /// Pause between requests.
    pub delay: Duration,
}

impl WeatherFetchPlan {
    /// One timestamp per day at the start time's hour.
    #[must_use]
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        (0..self.days)
            .map(|day| self.start + TimeDelta::days(i64::from(day)))
            .collect()
    }
}

/// Accumulates weather observations, skipping failed timestamps.
#[derive(Debug, Default)]
pub struct WeatherCollector {
    /// Observations in fetch order.
    pub observations: Vec<WeatherObservation>,
    /// Timestamps that failed and were skipped.
    pub failed: u64,
}

impl WeatherCollector {
    /// Records one timestamp's outcome. Failures are logged and
    /// counted, never propagated.
    pub fn absorb(
        &mut self,
        timestamp: DateTime<Utc>,
        result: Result<WeatherObservation, FetchError>,
    ) {
        match result {
            Ok(observation) => self.observations.push(observation),
            Err(error) => {
                log::error!("Weather fetch failed at {timestamp}: {error}");
                self.failed += 1;
            }
        }
    }
}

/// Fetches one weather observation per planned day, sequentially.
pub async fn run_weather_fetch(
    client: &MobilityClient,
    plan: &WeatherFetchPlan,
    mut on_unit_done: impl FnMut(u64, u64),
) -> WeatherCollector {
    let timestamps = plan.timestamps();
    let total = timestamps.len() as u64;

    let mut collector = WeatherCollector::default();

    for (i, &timestamp) in timestamps.iter().enumerate() {
        let result = client.weather(timestamp).await;
        collector.absorb(timestamp, result);
        on_unit_done(i as u64 + 1, total);

        if i + 1 < timestamps.len() {
            tokio::time::sleep(plan.delay).await;
        }
    }

    log::info!(
        "Weather fetch complete: {} observations ({} failed)",
        collector.observations.len(),
        collector.failed
    );

    collector
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use scooter_grid_models::GeoPoint;

    #[test]
    fn plan_expands_timestamp_major() {
        let plan = MobilityFetchPlan {
            start: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 9, 1, 2, 0, 0).unwrap(),
            interval: TimeDelta::hours(1),
            providers: vec!["lime".to_string(), "dott".to_string()],
            delay: Duration::ZERO,
        };

        let units = plan.units();
        assert_eq!(units.len(), 4);
        assert_eq!(units[0].provider, "lime");
        assert_eq!(units[1].provider, "dott");
        assert_eq!(units[0].timestamp, units[1].timestamp);
        assert_eq!(units[2].timestamp - units[0].timestamp, TimeDelta::hours(1));
    }

    #[test]
    fn end_is_exclusive() {
        let plan = MobilityFetchPlan {
            start: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 9, 1, 1, 0, 0).unwrap(),
            interval: TimeDelta::hours(1),
            providers: vec!["lime".to_string()],
            delay: Duration::ZERO,
        };
        assert_eq!(plan.units().len(), 1);
    }

    #[test]
    fn collector_keeps_successes_and_counts_failures() {
        let unit = FetchUnit {
            provider: "lime".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(),
        };
        let observation = ScooterObservation {
            provider: "lime".to_string(),
            timestamp: unit.timestamp,
            point: GeoPoint {
                latitude: 50.85,
                longitude: 4.35,
            },
        };

        let mut collector = PositionCollector::default();
        collector.absorb(&unit, Ok(vec![observation]));
        collector.absorb(
            &unit,
            Err(FetchError::Parse {
                message: "bad body".to_string(),
            }),
        );

        assert_eq!(collector.positions.len(), 1);
        assert_eq!(collector.succeeded, 1);
        assert_eq!(collector.failed, 1);
    }

    #[test]
    fn weather_plan_spaces_timestamps_by_one_day() {
        let plan = WeatherFetchPlan {
            start: Utc.with_ymd_and_hms(2024, 9, 1, 11, 0, 0).unwrap(),
            days: 30,
            delay: Duration::ZERO,
        };

        let timestamps = plan.timestamps();
        assert_eq!(timestamps.len(), 30);
        assert_eq!(timestamps[1] - timestamps[0], TimeDelta::days(1));
        assert_eq!(timestamps[29].format("%Y-%m-%d").to_string(), "2024-09-30");
    }
}
