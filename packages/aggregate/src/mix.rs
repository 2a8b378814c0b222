//! Combined scooter demand and public transport coverage per grid cell.
//!
//! Produces the merged table behind the transport/scooter overlay map:
//! every cell with scooter observations, its scooter count, and the
//! number of stations of each category in that cell. Cells that hold
//! stations but no scooters are not materialized (left-join onto the
//! scooter grid).

use std::collections::{BTreeMap, BTreeSet};

use scooter_grid_grid::assign_cell;
use scooter_grid_models::{GeoPoint, GridCell, GridConfig, TransportStation};

/// One row of the combined table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMixRow {
    /// The grid cell.
    pub cell: GridCell,
    /// Scooter observations in the cell.
    pub scooter_count: u64,
    /// Stations in the cell, keyed by category label.
    pub stations: BTreeMap<String, u64>,
}

/// The combined table plus the sorted set of category labels seen in
/// the station data, so tabular output can emit one column per
/// category even for rows where a category's count is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMix {
    /// All station categories observed, sorted.
    pub categories: Vec<String>,
    /// Rows ordered by cell (row, then col).
    pub rows: Vec<TransportMixRow>,
}

/// Joins per-cell scooter counts with per-cell station counts.
#[must_use]
pub fn transport_mix(
    scooters: &[GeoPoint],
    stations: &[TransportStation],
    config: &GridConfig,
) -> TransportMix {
    let mut scooter_counts: BTreeMap<GridCell, u64> = BTreeMap::new();
    for point in scooters {
        *scooter_counts.entry(assign_cell(*point, config)).or_insert(0) += 1;
    }

    let mut station_counts: BTreeMap<(GridCell, String), u64> = BTreeMap::new();
    let mut categories: BTreeSet<String> = BTreeSet::new();
    for station in stations {
        let cell = assign_cell(station.point, config);
        categories.insert(station.category.clone());
        *station_counts
            .entry((cell, station.category.clone()))
            .or_insert(0) += 1;
    }

    let rows = scooter_counts
        .into_iter()
        .map(|(cell, scooter_count)| {
            let stations = categories
                .iter()
                .filter_map(|category| {
                    station_counts
                        .get(&(cell, category.clone()))
                        .map(|&count| (category.clone(), count))
                })
                .collect();
            TransportMixRow {
                cell,
                scooter_count,
                stations,
            }
        })
        .collect();

    TransportMix {
        categories: categories.into_iter().collect(),
        rows,
    }
}
