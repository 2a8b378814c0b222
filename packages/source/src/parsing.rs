//! Coordinate and timestamp extraction from raw string fields.
//!
//! The two location formats in the source data are NOT symmetric:
//! WKT points are `POINT (lon lat)` while the open-data exports join
//! coordinates as `"lat,lon"`. Parsing them with the same field order
//! would silently mirror every position across the diagonal.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use scooter_grid_models::GeoPoint;

static WKT_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"POINT \((-?[\d.]+) (-?[\d.]+)\)").unwrap_or_else(|_| unreachable!())
});

/// Parses a WKT point string `"POINT (lon lat)"`.
///
/// Returns `None` for malformed strings or out-of-range coordinates.
#[must_use]
pub fn parse_wkt_point(s: &str) -> Option<GeoPoint> {
    let captures = WKT_POINT.captures(s)?;
    let longitude = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let latitude = captures.get(2)?.as_str().parse::<f64>().ok()?;
    GeoPoint::checked(latitude, longitude)
}

/// Parses a comma-joined `"lat,lon"` string (the `Geo Point` /
/// `Geographical coordinates` columns of the open-data exports).
///
/// Returns `None` for malformed strings or out-of-range coordinates.
#[must_use]
pub fn parse_lat_lon(s: &str) -> Option<GeoPoint> {
    let (lat_str, lon_str) = s.split_once(',')?;
    let latitude = lat_str.trim().parse::<f64>().ok()?;
    let longitude = lon_str.trim().parse::<f64>().ok()?;
    GeoPoint::checked(latitude, longitude)
}

/// Parses an ISO-8601-ish timestamp string as UTC.
///
/// Accepts RFC 3339 (with offset), and naive `T`- or space-separated
/// datetimes with optional fractional seconds, which is what the fetch
/// loop writes into `timestamp_requested`.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wkt_is_lon_then_lat() {
        let p = parse_wkt_point("POINT (4.3517 50.8503)").unwrap();
        assert!((p.longitude - 4.3517).abs() < f64::EPSILON);
        assert!((p.latitude - 50.8503).abs() < f64::EPSILON);
    }

    #[test]
    fn comma_joined_is_lat_then_lon() {
        let p = parse_lat_lon("50.8503, 4.3517").unwrap();
        assert!((p.latitude - 50.8503).abs() < f64::EPSILON);
        assert!((p.longitude - 4.3517).abs() < f64::EPSILON);
    }

    #[test]
    fn wkt_accepts_negative_coordinates() {
        let p = parse_wkt_point("POINT (-87.6298 41.8781)").unwrap();
        assert!((p.longitude - -87.6298).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_malformed_wkt() {
        assert!(parse_wkt_point("POINT 4.3517 50.8503").is_none());
        assert!(parse_wkt_point("").is_none());
        assert!(parse_wkt_point("LINESTRING (0 0, 1 1)").is_none());
    }

    #[test]
    fn rejects_out_of_range_wkt_coordinates() {
        // lon/lat swapped relative to WKT order: latitude 180 is invalid.
        assert!(parse_wkt_point("POINT (50.8503 180.0)").is_none());
    }

    #[test]
    fn rejects_malformed_lat_lon() {
        assert!(parse_lat_lon("50.8503").is_none());
        assert!(parse_lat_lon("a,b").is_none());
    }

    #[test]
    fn parses_naive_iso_timestamps() {
        let dt = parse_timestamp("2024-09-01T00:00:00").unwrap();
        assert_eq!(dt.to_string(), "2024-09-01 00:00:00 UTC");
        let dt = parse_timestamp("2024-09-01 14:30:00.250").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let dt = parse_timestamp("2024-09-01T12:00:00+02:00").unwrap();
        assert_eq!(dt.to_string(), "2024-09-01 10:00:00 UTC");
    }

    #[test]
    fn rejects_invalid_timestamp() {
        assert!(parse_timestamp("not-a-date").is_none());
    }
}
