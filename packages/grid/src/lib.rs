#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grid indexing: maps geographic points onto the fixed-size grid
//! defined by a [`GridConfig`].
//!
//! Indexing uses floor division (rounding toward negative infinity), so
//! coordinates below or west of the origin land in negative rows/cols
//! with symmetric cell boundaries. Truncation toward zero would give
//! cell `0` twice the width around the origin, which silently skews
//! counts near the grid anchor.

use scooter_grid_models::{GeoPoint, GridCell, GridConfig};

/// The south/west and north/east corners of a grid cell, for drawing
/// the cell as a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    /// Southern edge latitude.
    pub lat_min: f64,
    /// Northern edge latitude.
    pub lat_max: f64,
    /// Western edge longitude.
    pub lon_min: f64,
    /// Eastern edge longitude.
    pub lon_max: f64,
}

/// Assigns a point to its grid cell.
///
/// Deterministic and defined for all finite coordinates. A point lying
/// exactly on a cell's southern or western edge belongs to that cell,
/// never to its neighbor (floor semantics).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn assign_cell(point: GeoPoint, config: &GridConfig) -> GridCell {
    GridCell {
        row: ((point.latitude - config.origin_lat) / config.lat_step).floor() as i32,
        col: ((point.longitude - config.origin_lon) / config.lon_step).floor() as i32,
    }
}

/// Inverts the cell assignment for display: the geographic rectangle
/// covered by a cell.
#[must_use]
pub fn cell_bounds(cell: GridCell, config: &GridConfig) -> CellBounds {
    let lat_min = config.origin_lat + f64::from(cell.row) * config.lat_step;
    let lon_min = config.origin_lon + f64::from(cell.col) * config.lon_step;
    CellBounds {
        lat_min,
        lat_max: lat_min + config.lat_step,
        lon_min,
        lon_max: lon_min + config.lon_step,
    }
}

/// The center point of a grid cell.
///
/// Used as the representative position for municipality lookups: all
/// points in a cell inherit the municipality of the cell's center.
#[must_use]
pub fn cell_center(cell: GridCell, config: &GridConfig) -> GeoPoint {
    GeoPoint {
        latitude: config.origin_lat + (f64::from(cell.row) + 0.5) * config.lat_step,
        longitude: config.origin_lon + (f64::from(cell.col) + 0.5) * config.lon_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brussels() -> GridConfig {
        GridConfig::brussels()
    }

    #[test]
    fn assignment_is_deterministic() {
        let point = GeoPoint {
            latitude: 50.8503,
            longitude: 4.3517,
        };
        let config = brussels();
        let first = assign_cell(point, &config);
        for _ in 0..10 {
            assert_eq!(assign_cell(point, &config), first);
        }
    }

    #[test]
    fn points_within_one_step_share_the_origin_cell() {
        let config = brussels();
        let a = GeoPoint {
            latitude: 50.7964,
            longitude: 4.3124,
        };
        let b = GeoPoint {
            latitude: 50.7985,
            longitude: 4.3159,
        };
        assert_eq!(assign_cell(a, &config), GridCell { row: 0, col: 0 });
        assert_eq!(assign_cell(b, &config), GridCell { row: 0, col: 0 });
    }

    #[test]
    fn point_south_of_origin_maps_to_negative_row() {
        let config = brussels();
        let point = GeoPoint {
            latitude: 50.7964 - 0.0001,
            longitude: 4.3124,
        };
        let cell = assign_cell(point, &config);
        assert_eq!(cell.row, -1);
        assert_eq!(cell.col, 0);
    }

    #[test]
    fn exact_step_boundaries_belong_to_the_upper_cell() {
        // Steps of 0.25 are exactly representable, so origin + k * step
        // is the true boundary value and the assertion probes floor
        // semantics rather than float rounding noise.
        let config = GridConfig {
            origin_lat: 50.0,
            origin_lon: 4.0,
            lat_step: 0.25,
            lon_step: 0.25,
        };
        for k in [-3_i32, -1, 0, 1, 5] {
            let point = GeoPoint {
                latitude: config.origin_lat + f64::from(k) * config.lat_step,
                longitude: config.origin_lon,
            };
            assert_eq!(assign_cell(point, &config).row, k, "k = {k}");
        }
    }

    #[test]
    fn cell_center_is_within_half_a_step_of_the_point() {
        let config = brussels();
        let points = [
            (50.8503, 4.3517),
            (50.7964, 4.3124),
            (50.7901, 4.3001),
            (50.9122, 4.4411),
        ];
        for (lat, lon) in points {
            let point = GeoPoint {
                latitude: lat,
                longitude: lon,
            };
            let center = cell_center(assign_cell(point, &config), &config);
            assert!((center.latitude - lat).abs() <= config.lat_step / 2.0 + 1e-12);
            assert!((center.longitude - lon).abs() <= config.lon_step / 2.0 + 1e-12);
        }
    }

    #[test]
    fn bounds_invert_the_assignment() {
        let config = brussels();
        let cell = GridCell { row: 4, col: -2 };
        let bounds = cell_bounds(cell, &config);
        assert!((bounds.lat_max - bounds.lat_min - config.lat_step).abs() < 1e-12);
        let south_west = GeoPoint {
            latitude: bounds.lat_min,
            longitude: bounds.lon_min,
        };
        assert_eq!(assign_cell(south_west, &config), cell);
    }
}
