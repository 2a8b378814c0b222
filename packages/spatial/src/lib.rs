#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for municipality attribution.
//!
//! Loads administrative boundary polygons from a `GeoJSON`
//! `FeatureCollection`, builds an R-tree, and answers point-in-polygon
//! lookups. The aggregation pipeline queries it once per distinct grid
//! cell center, so lookups are `O(distinct cells x polygons)` rather
//! than per raw observation.

use geo::{Contains, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use rstar::{AABB, RTree, RTreeObject};
use scooter_grid_models::GeoPoint;
use thiserror::Error;

/// Errors that can occur while loading boundary data.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// Reading the boundary file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The boundary file is not valid `GeoJSON`.
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The boundary file parsed but is not a `FeatureCollection`.
    #[error("expected a GeoJSON FeatureCollection")]
    NotAFeatureCollection,
}

/// A boundary polygon stored in the R-tree with its metadata.
struct MunicipalityEntry {
    /// Position of the feature in the source file. Ties between
    /// overlapping polygons are broken by the lowest index, so lookups
    /// are deterministic even on malformed inputs.
    input_index: usize,
    name: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for MunicipalityEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over municipality boundaries.
///
/// Constructed once per run and shared read-only with every join call.
pub struct MunicipalityIndex {
    tree: RTree<MunicipalityEntry>,
}

impl MunicipalityIndex {
    /// Loads a `GeoJSON` file and builds the index, reading each
    /// feature's name from the `name_property` attribute (`name_fr` for
    /// the Brussels municipalities export).
    ///
    /// Features with a missing name, unparseable geometry, or a
    /// non-polygon geometry type are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the file cannot be read or is not a
    /// `GeoJSON` `FeatureCollection`.
    pub fn from_geojson_file(
        path: &std::path::Path,
        name_property: &str,
    ) -> Result<Self, SpatialError> {
        let contents = std::fs::read_to_string(path)?;
        let geojson: GeoJson = contents.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(SpatialError::NotAFeatureCollection);
        };
        Ok(Self::from_feature_collection(collection, name_property))
    }

    /// Builds the index from an already-parsed feature collection.
    #[must_use]
    pub fn from_feature_collection(collection: FeatureCollection, name_property: &str) -> Self {
        let mut entries = Vec::new();

        for (input_index, feature) in collection.features.into_iter().enumerate() {
            let Some(name) = feature
                .property(name_property)
                .and_then(geojson::JsonValue::as_str)
                .map(str::to_owned)
            else {
                log::warn!("Boundary feature {input_index} has no '{name_property}' property");
                continue;
            };

            let Some(polygon) = feature.geometry.and_then(to_multi_polygon) else {
                log::warn!("Boundary feature '{name}' has no usable polygon geometry");
                continue;
            };

            let envelope = compute_envelope(&polygon);

            entries.push(MunicipalityEntry {
                input_index,
                name,
                envelope,
                polygon,
            });
        }

        log::info!("Loaded {} municipality boundaries", entries.len());

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Returns the name of the municipality containing the point, or
    /// `None` if the point falls outside every boundary.
    ///
    /// Administrative boundaries are assumed non-overlapping. If the
    /// source data is malformed and several polygons contain the point,
    /// the feature that appeared first in the input wins.
    #[must_use]
    pub fn locate(&self, point: GeoPoint) -> Option<&str> {
        let geo_point = geo::Point::new(point.longitude, point.latitude);
        let query_env = AABB::from_point([point.longitude, point.latitude]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.contains(&geo_point))
            .min_by_key(|entry| entry.input_index)
            .map(|entry| entry.name.as_str())
    }

    /// Number of boundaries in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// `true` when no boundaries were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multi_polygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_feature(name: &str, min: f64, max: f64) -> String {
        format!(
            r#"{{
                "type": "Feature",
                "properties": {{ "name_fr": "{name}" }},
                "geometry": {{
                    "type": "Polygon",
                    "coordinates": [[
                        [{min}, {min}], [{max}, {min}],
                        [{max}, {max}], [{min}, {max}], [{min}, {min}]
                    ]]
                }}
            }}"#
        )
    }

    fn collection(features: &[String]) -> FeatureCollection {
        let raw = format!(
            r#"{{ "type": "FeatureCollection", "features": [{}] }}"#,
            features.join(",")
        );
        let GeoJson::FeatureCollection(fc) = raw.parse().unwrap() else {
            panic!("not a feature collection");
        };
        fc
    }

    #[test]
    fn locates_containing_polygon() {
        let fc = collection(&[
            square_feature("Ixelles", 0.0, 1.0),
            square_feature("Uccle", 2.0, 3.0),
        ]);
        let index = MunicipalityIndex::from_feature_collection(fc, "name_fr");
        assert_eq!(index.len(), 2);

        let inside = GeoPoint {
            latitude: 2.5,
            longitude: 2.5,
        };
        assert_eq!(index.locate(inside), Some("Uccle"));
    }

    #[test]
    fn point_outside_all_polygons_is_none() {
        let fc = collection(&[square_feature("Ixelles", 0.0, 1.0)]);
        let index = MunicipalityIndex::from_feature_collection(fc, "name_fr");

        let outside = GeoPoint {
            latitude: 5.0,
            longitude: 5.0,
        };
        assert_eq!(index.locate(outside), None);
    }

    #[test]
    fn overlapping_polygons_resolve_to_first_in_input_order() {
        let fc = collection(&[
            square_feature("First", 0.0, 2.0),
            square_feature("Second", 0.0, 2.0),
        ]);
        let index = MunicipalityIndex::from_feature_collection(fc, "name_fr");

        let point = GeoPoint {
            latitude: 1.0,
            longitude: 1.0,
        };
        assert_eq!(index.locate(point), Some("First"));
    }

    #[test]
    fn features_without_the_name_property_are_skipped() {
        let unnamed = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]
            }
        }"#
        .to_string();
        let fc = collection(&[unnamed, square_feature("Named", 2.0, 3.0)]);
        let index = MunicipalityIndex::from_feature_collection(fc, "name_fr");
        assert_eq!(index.len(), 1);
    }
}
