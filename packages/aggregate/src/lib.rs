#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sparse grid aggregation.
//!
//! Groups point observations into [`AggregationRecord`]s keyed by grid
//! cell plus the optional hour, category, and municipality dimensions.
//! Grouping is associative and commutative over disjoint input
//! partitions, so counts are conserved no matter how the input is
//! split.

pub mod mix;
pub mod profile;
pub mod proximity;
pub mod ranking;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use scooter_grid_grid::{assign_cell, cell_center};
use scooter_grid_models::{
    AggregationRecord, GeoPoint, GridCell, GridConfig, ScooterObservation, TransportStation,
    floor_to_hour,
};
use scooter_grid_spatial::MunicipalityIndex;

/// One input point with its optional grouping attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSample {
    /// Observed position.
    pub point: GeoPoint,
    /// Observation time, required when hourly grouping is requested.
    pub timestamp: Option<DateTime<Utc>>,
    /// Category label, used when category grouping is requested.
    pub category: Option<String>,
}

impl From<&ScooterObservation> for PointSample {
    fn from(obs: &ScooterObservation) -> Self {
        Self {
            point: obs.point,
            timestamp: Some(obs.timestamp),
            category: None,
        }
    }
}

impl From<&TransportStation> for PointSample {
    fn from(station: &TransportStation) -> Self {
        Self {
            point: station.point,
            timestamp: None,
            category: Some(station.category.clone()),
        }
    }
}

/// Which optional dimensions the grouping key carries.
#[derive(Default, Clone, Copy)]
pub struct GroupingOptions<'a> {
    /// Group by the timestamp floored to the hour.
    pub by_hour: bool,
    /// Group by the category label.
    pub by_category: bool,
    /// Join each distinct cell's center against these boundaries and
    /// group by the resulting municipality name.
    pub municipalities: Option<&'a MunicipalityIndex>,
}

/// Groups samples into the sparse set of [`AggregationRecord`]s.
///
/// Samples lacking a timestamp are dropped when hourly grouping is
/// requested. The municipality join runs once per distinct cell, not
/// per sample: every point in a cell inherits the municipality of the
/// cell's center. Output is ordered by grouping key (cell row, then
/// col, then the optional dimensions), so identical input always
/// produces identical output.
#[must_use]
pub fn aggregate(
    samples: impl IntoIterator<Item = PointSample>,
    config: &GridConfig,
    options: &GroupingOptions<'_>,
) -> Vec<AggregationRecord> {
    type Key = (
        GridCell,
        Option<DateTime<Utc>>,
        Option<String>,
        Option<String>,
    );

    let mut counts: BTreeMap<Key, u64> = BTreeMap::new();
    let mut municipality_cache: BTreeMap<GridCell, String> = BTreeMap::new();
    let mut dropped: u64 = 0;

    for sample in samples {
        let cell = assign_cell(sample.point, config);

        let time_bucket = if options.by_hour {
            match sample.timestamp {
                Some(ts) => Some(floor_to_hour(ts)),
                None => {
                    dropped += 1;
                    continue;
                }
            }
        } else {
            None
        };

        let category = options
            .by_category
            .then(|| sample.category.unwrap_or_default());

        let municipality = options.municipalities.map(|index| {
            municipality_cache
                .entry(cell)
                .or_insert_with(|| {
                    index
                        .locate(cell_center(cell, config))
                        .unwrap_or_default()
                        .to_string()
                })
                .clone()
        });

        *counts
            .entry((cell, time_bucket, category, municipality))
            .or_insert(0) += 1;
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} samples without a timestamp from hourly grouping");
    }

    counts
        .into_iter()
        .map(
            |((grid_cell, time_bucket, category, municipality), count)| AggregationRecord {
                grid_cell,
                time_bucket,
                category,
                municipality,
                count,
            },
        )
        .collect()
}

/// Sum of all record counts, for conservation checks and run summaries.
#[must_use]
pub fn total_count(records: &[AggregationRecord]) -> u64 {
    records.iter().map(|r| r.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn sample(lat: f64, lon: f64, hour: u32, category: &str) -> PointSample {
        PointSample {
            point: GeoPoint {
                latitude: lat,
                longitude: lon,
            },
            timestamp: Some(Utc.with_ymd_and_hms(2024, 9, 1, hour, 17, 3).unwrap()),
            category: Some(category.to_string()),
        }
    }

    #[test]
    fn identical_keys_collapse_and_differing_hours_split() {
        let config = GridConfig::brussels();
        let samples = vec![
            sample(50.7970, 4.3130, 8, "Bus"),
            sample(50.7971, 4.3131, 8, "Bus"),
            sample(50.7970, 4.3130, 9, "Bus"),
        ];

        let records = aggregate(
            samples,
            &config,
            &GroupingOptions {
                by_hour: true,
                by_category: true,
                municipalities: None,
            },
        );

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].count, 2);
        assert_eq!(
            records[0].time_bucket,
            Some(Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap())
        );
        assert_eq!(records[1].count, 1);
    }

    #[test]
    fn counts_are_conserved_across_partitions() {
        let config = GridConfig::brussels();
        let all: Vec<PointSample> = (0..40)
            .map(|i| {
                sample(
                    50.7964 + f64::from(i) * 0.0011,
                    4.3124 + f64::from(i % 7) * 0.0017,
                    u32::try_from(i % 24).unwrap(),
                    "Bus",
                )
            })
            .collect();

        let options = GroupingOptions {
            by_hour: true,
            by_category: false,
            municipalities: None,
        };

        let whole = aggregate(all.clone(), &config, &options);
        let (left, right) = all.split_at(17);
        let parts_total = total_count(aggregate(left.to_vec(), &config, &options).as_slice())
            + total_count(aggregate(right.to_vec(), &config, &options).as_slice());

        assert_eq!(total_count(&whole), 40);
        assert_eq!(parts_total, 40);
    }

    #[test]
    fn output_order_is_reproducible() {
        let config = GridConfig::brussels();
        let forward = vec![
            sample(50.80, 4.32, 8, "Bus"),
            sample(50.82, 4.35, 8, "Bus"),
            sample(50.79, 4.31, 8, "Bus"),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let options = GroupingOptions::default();
        assert_eq!(
            aggregate(forward, &config, &options),
            aggregate(reversed, &config, &options)
        );
    }

    #[test]
    fn hourly_grouping_drops_samples_without_timestamp() {
        let config = GridConfig::brussels();
        let mut samples = vec![sample(50.80, 4.32, 8, "Bus")];
        samples.push(PointSample {
            point: GeoPoint {
                latitude: 50.80,
                longitude: 4.32,
            },
            timestamp: None,
            category: None,
        });

        let records = aggregate(
            samples,
            &config,
            &GroupingOptions {
                by_hour: true,
                by_category: false,
                municipalities: None,
            },
        );
        assert_eq!(total_count(&records), 1);
    }

    #[test]
    fn municipality_join_groups_by_containing_polygon() {
        use geojson::GeoJson;

        // One square polygon around the origin cell's neighborhood.
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "name_fr": "Bruxelles" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [4.30, 50.79], [4.40, 50.79],
                        [4.40, 50.90], [4.30, 50.90], [4.30, 50.79]
                    ]]
                }
            }]
        }"#;
        let GeoJson::FeatureCollection(fc) = raw.parse().unwrap() else {
            panic!("not a feature collection");
        };
        let index = MunicipalityIndex::from_feature_collection(fc, "name_fr");

        let config = GridConfig::brussels();
        let inside = sample(50.80, 4.32, 8, "Bus");
        let outside = sample(50.95, 4.32, 8, "Bus");

        let records = aggregate(
            vec![inside, outside],
            &config,
            &GroupingOptions {
                by_hour: false,
                by_category: false,
                municipalities: Some(&index),
            },
        );

        let municipalities: Vec<&str> = records
            .iter()
            .filter_map(|r| r.municipality.as_deref())
            .collect();
        assert!(municipalities.contains(&"Bruxelles"));
        // Outside every polygon -> empty string, not an error.
        assert!(municipalities.contains(&""));
    }
}
