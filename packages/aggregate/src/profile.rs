//! Temporal usage profiles: when scooters are observed, independent of
//! where.
//!
//! Supports the monthly analysis summaries (usage by hour of day, by
//! weekday, weekend vs weekday) and the per-cell weekend preference
//! ratio.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use scooter_grid_grid::assign_cell;
use scooter_grid_models::{GridCell, GridConfig, ScooterObservation};

/// Aggregate usage counts across time dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsageProfile {
    /// Observations per hour of day, indexed 0-23.
    pub by_hour_of_day: [u64; 24],
    /// Observations per weekday, indexed Monday = 0 .. Sunday = 6.
    pub by_weekday: [u64; 7],
    /// Total observations on Monday-Friday.
    pub weekday_total: u64,
    /// Total observations on Saturday and Sunday.
    pub weekend_total: u64,
}

const fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Builds the usage profile for a set of observation timestamps.
#[must_use]
pub fn usage_profile(timestamps: impl IntoIterator<Item = DateTime<Utc>>) -> UsageProfile {
    let mut profile = UsageProfile::default();

    for ts in timestamps {
        profile.by_hour_of_day[ts.hour() as usize] += 1;
        let weekday = ts.weekday();
        profile.by_weekday[weekday.num_days_from_monday() as usize] += 1;
        if is_weekend(weekday) {
            profile.weekend_total += 1;
        } else {
            profile.weekday_total += 1;
        }
    }

    profile
}

/// Weekend preference of one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDayTypeSplit {
    /// The grid cell.
    pub cell: GridCell,
    /// Observations on Saturday/Sunday.
    pub weekend: u64,
    /// Observations on Monday-Friday.
    pub weekday: u64,
    /// `weekend / (weekday + 1)`; the `+ 1` keeps cells that were never
    /// visited on weekdays finite and comparable.
    pub ratio: f64,
}

/// Splits per-cell counts by day type and computes the weekend ratio.
/// Output is ordered by cell (row, then col).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weekend_split_by_cell(
    observations: &[ScooterObservation],
    config: &GridConfig,
) -> Vec<CellDayTypeSplit> {
    let mut splits: BTreeMap<GridCell, (u64, u64)> = BTreeMap::new();

    for obs in observations {
        let cell = assign_cell(obs.point, config);
        let entry = splits.entry(cell).or_insert((0, 0));
        if is_weekend(obs.timestamp.weekday()) {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    splits
        .into_iter()
        .map(|(cell, (weekend, weekday))| CellDayTypeSplit {
            cell,
            weekend,
            weekday,
            ratio: weekend as f64 / (weekday + 1) as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use scooter_grid_models::GeoPoint;

    #[test]
    fn profiles_count_hours_and_weekdays() {
        // 2024-09-02 is a Monday, 2024-09-07 a Saturday.
        let timestamps = vec![
            Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 9, 7, 17, 0, 0).unwrap(),
        ];

        let profile = usage_profile(timestamps);
        assert_eq!(profile.by_hour_of_day[8], 2);
        assert_eq!(profile.by_hour_of_day[17], 1);
        assert_eq!(profile.by_weekday[0], 2); // Monday
        assert_eq!(profile.by_weekday[5], 1); // Saturday
        assert_eq!(profile.weekday_total, 2);
        assert_eq!(profile.weekend_total, 1);
    }

    #[test]
    fn weekend_ratio_uses_damped_denominator() {
        let config = GridConfig::brussels();
        let point = GeoPoint {
            latitude: 50.80,
            longitude: 4.32,
        };
        let obs = |day: u32| ScooterObservation {
            provider: "lime".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 9, day, 12, 0, 0).unwrap(),
            point,
        };

        // Two weekend observations (Sat 7th), one weekday (Mon 2nd).
        let observations = vec![obs(7), obs(7), obs(2)];
        let splits = weekend_split_by_cell(&observations, &config);

        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].weekend, 2);
        assert_eq!(splits[0].weekday, 1);
        assert!((splits[0].ratio - 1.0).abs() < f64::EPSILON); // 2 / (1 + 1)
    }
}
