//! Great-circle proximity counts for the parking demand analysis.
//!
//! Uses the haversine formula on a spherical Earth. This is a
//! different metric from the grid indexer's planar degree steps and
//! must stay that way: the high/low demand ranking depends on real
//! sub-kilometer distances, not grid quantization.

use scooter_grid_models::{GeoPoint, ParkingZone};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points, in meters.
#[must_use]
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Number of points within `radius_meters` of `center` (inclusive).
///
/// Naive `O(points)` scan; the data volumes here do not warrant a
/// spatial index.
#[must_use]
pub fn count_within_radius(center: GeoPoint, points: &[GeoPoint], radius_meters: f64) -> u64 {
    points
        .iter()
        .filter(|p| haversine_meters(center, **p) <= radius_meters)
        .count() as u64
}

/// A parking zone together with the number of scooters observed near it.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDemand {
    /// The parking zone.
    pub zone: ParkingZone,
    /// Scooters within the query radius of the zone.
    pub scooter_count: u64,
}

/// Counts scooters within `radius_meters` of every parking zone.
#[must_use]
pub fn parking_demand(
    zones: &[ParkingZone],
    scooters: &[GeoPoint],
    radius_meters: f64,
) -> Vec<ZoneDemand> {
    zones
        .iter()
        .map(|zone| ZoneDemand {
            zone: zone.clone(),
            scooter_count: count_within_radius(zone.point, scooters, radius_meters),
        })
        .collect()
}

/// The `n` busiest zones, highest count first. Ties are broken by zone
/// name so the ranking is reproducible.
#[must_use]
pub fn top_zones(demand: &[ZoneDemand], n: usize) -> Vec<&ZoneDemand> {
    let mut ranked: Vec<&ZoneDemand> = demand.iter().collect();
    ranked.sort_by(|a, b| {
        b.scooter_count
            .cmp(&a.scooter_count)
            .then_with(|| a.zone.name.cmp(&b.zone.name))
    });
    ranked.truncate(n);
    ranked
}

/// The `n` quietest zones, lowest count first. Ties are broken by zone
/// name so the ranking is reproducible.
#[must_use]
pub fn bottom_zones(demand: &[ZoneDemand], n: usize) -> Vec<&ZoneDemand> {
    let mut ranked: Vec<&ZoneDemand> = demand.iter().collect();
    ranked.sort_by(|a, b| {
        a.scooter_count
            .cmp(&b.scooter_count)
            .then_with(|| a.zone.name.cmp(&b.zone.name))
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str, lat: f64, lon: f64) -> ParkingZone {
        ParkingZone {
            name: name.to_string(),
            status: "Active".to_string(),
            address: String::new(),
            municipality: String::new(),
            total_hours: String::new(),
            google_maps_url: None,
            point: GeoPoint {
                latitude: lat,
                longitude: lon,
            },
        }
    }

    #[test]
    fn haversine_of_100m_north_is_within_one_percent() {
        let center = GeoPoint {
            latitude: 50.8503,
            longitude: 4.3517,
        };
        // 100m due north: one degree of latitude spans ~111,195m on a
        // sphere of radius 6,371,000m (R * pi / 180).
        let degrees_per_meter = 180.0 / (EARTH_RADIUS_METERS * std::f64::consts::PI);
        let north = GeoPoint {
            latitude: center.latitude + 100.0 * degrees_per_meter,
            longitude: center.longitude,
        };

        let distance = haversine_meters(center, north);
        assert!(
            (distance - 100.0).abs() < 1.0,
            "expected ~100m, got {distance}"
        );
    }

    #[test]
    fn haversine_is_symmetric_and_zero_on_self() {
        let a = GeoPoint {
            latitude: 50.8503,
            longitude: 4.3517,
        };
        let b = GeoPoint {
            latitude: 50.7964,
            longitude: 4.3124,
        };
        assert!((haversine_meters(a, b) - haversine_meters(b, a)).abs() < 1e-9);
        assert!(haversine_meters(a, a) < 1e-9);
    }

    #[test]
    fn counts_points_inside_radius_inclusively() {
        let center = GeoPoint {
            latitude: 50.8503,
            longitude: 4.3517,
        };
        let degrees_per_meter = 180.0 / (EARTH_RADIUS_METERS * std::f64::consts::PI);
        let near = GeoPoint {
            latitude: center.latitude + 50.0 * degrees_per_meter,
            longitude: center.longitude,
        };
        let far = GeoPoint {
            latitude: center.latitude + 300.0 * degrees_per_meter,
            longitude: center.longitude,
        };

        assert_eq!(count_within_radius(center, &[near, far], 100.0), 1);
        assert_eq!(count_within_radius(center, &[near, far], 500.0), 2);
    }

    #[test]
    fn zone_ranking_is_deterministic_under_ties() {
        let scooters = [GeoPoint {
            latitude: 50.8503,
            longitude: 4.3517,
        }];
        let zones = [
            zone("B", 50.8503, 4.3517),
            zone("A", 50.8503, 4.3517),
            zone("C", 52.0, 5.0),
        ];

        let demand = parking_demand(&zones, &scooters, 100.0);
        let top = top_zones(&demand, 2);
        assert_eq!(top[0].zone.name, "A");
        assert_eq!(top[1].zone.name, "B");

        let bottom = bottom_zones(&demand, 1);
        assert_eq!(bottom[0].zone.name, "C");
        assert_eq!(bottom[0].scooter_count, 0);
    }
}
