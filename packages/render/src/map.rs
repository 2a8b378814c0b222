//! Self-contained Leaflet HTML map builder.
//!
//! The builder collects rectangle, circle-marker, marker, and `GeoJSON`
//! layer primitives and emits one HTML file with the Leaflet assets
//! loaded from the CDN. Popup text is JSON-escaped into JS string
//! literals, so arbitrary names and addresses are safe to embed.

use std::fmt::Write as _;
use std::path::Path;

use scooter_grid_models::GeoPoint;

use crate::RenderError;

/// Base tile layer for a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileLayer {
    /// Standard OpenStreetMap raster tiles.
    #[default]
    OpenStreetMap,
    /// The muted CartoDB Positron style used by the demand maps.
    CartoDbPositron,
}

impl TileLayer {
    const fn url(self) -> &'static str {
        match self {
            Self::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            Self::CartoDbPositron => {
                "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png"
            }
        }
    }

    const fn attribution(self) -> &'static str {
        match self {
            Self::OpenStreetMap => "&copy; OpenStreetMap contributors",
            Self::CartoDbPositron => "&copy; OpenStreetMap contributors &copy; CARTO",
        }
    }
}

enum Element {
    Rectangle {
        south: f64,
        west: f64,
        north: f64,
        east: f64,
        color: String,
        fill_opacity: f64,
        popup: Option<String>,
    },
    CircleMarker {
        center: GeoPoint,
        radius: u32,
        color: String,
        fill_opacity: f64,
        popup: Option<String>,
    },
    Marker {
        location: GeoPoint,
        popup: Option<String>,
    },
    GeoJsonLayer {
        geojson: String,
        fill_color: String,
        line_color: String,
        weight: u32,
        fill_opacity: f64,
        popup_property: Option<String>,
    },
}

/// Builds one interactive map artifact.
pub struct MapBuilder {
    title: String,
    center: GeoPoint,
    zoom: u8,
    tiles: TileLayer,
    elements: Vec<Element>,
}

impl MapBuilder {
    /// Creates a map centered on `center` at the given zoom level,
    /// with OpenStreetMap tiles.
    #[must_use]
    pub fn new(title: impl Into<String>, center: GeoPoint, zoom: u8) -> Self {
        Self {
            title: title.into(),
            center,
            zoom,
            tiles: TileLayer::default(),
            elements: Vec::new(),
        }
    }

    /// Switches the base tile layer.
    #[must_use]
    pub const fn with_tiles(mut self, tiles: TileLayer) -> Self {
        self.tiles = tiles;
        self
    }

    /// Adds a filled rectangle spanning `south..north` x `west..east`.
    pub fn add_rectangle(
        &mut self,
        south: f64,
        west: f64,
        north: f64,
        east: f64,
        color: &str,
        fill_opacity: f64,
        popup: Option<String>,
    ) {
        self.elements.push(Element::Rectangle {
            south,
            west,
            north,
            east,
            color: color.to_string(),
            fill_opacity,
            popup,
        });
    }

    /// Adds a fixed-pixel-radius circle marker.
    pub fn add_circle_marker(
        &mut self,
        center: GeoPoint,
        radius: u32,
        color: &str,
        fill_opacity: f64,
        popup: Option<String>,
    ) {
        self.elements.push(Element::CircleMarker {
            center,
            radius,
            color: color.to_string(),
            fill_opacity,
            popup,
        });
    }

    /// Adds a standard pin marker.
    pub fn add_marker(&mut self, location: GeoPoint, popup: Option<String>) {
        self.elements.push(Element::Marker { location, popup });
    }

    /// Adds a `GeoJSON` overlay. When `popup_property` is set, each
    /// feature gets a popup showing that property's value.
    pub fn add_geojson_layer(
        &mut self,
        geojson: impl Into<String>,
        fill_color: &str,
        line_color: &str,
        weight: u32,
        fill_opacity: f64,
        popup_property: Option<String>,
    ) {
        self.elements.push(Element::GeoJsonLayer {
            geojson: geojson.into(),
            fill_color: fill_color.to_string(),
            line_color: line_color.to_string(),
            weight,
            fill_opacity,
            popup_property,
        });
    }

    /// Renders the complete HTML document.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut script = String::new();
        let _ = writeln!(
            script,
            "var map = L.map('map').setView([{}, {}], {});",
            self.center.latitude, self.center.longitude, self.zoom
        );
        let _ = writeln!(
            script,
            "L.tileLayer({}, {{ attribution: {} }}).addTo(map);",
            js_string(self.tiles.url()),
            js_string(self.tiles.attribution())
        );

        for element in &self.elements {
            write_element(&mut script, element);
        }

        format!(
            "<!DOCTYPE html>\n\
             <html>\n<head>\n<meta charset=\"utf-8\"/>\n\
             <title>{title}</title>\n\
             <link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\"/>\n\
             <script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>\n\
             <style>html, body, #map {{ height: 100%; margin: 0; }}</style>\n\
             </head>\n<body>\n<div id=\"map\"></div>\n\
             <script>\n{script}</script>\n\
             </body>\n</html>\n",
            title = html_escape(&self.title),
        )
    }

    /// Writes the map to a file.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the file cannot be written.
    pub fn write_html(&self, path: &Path) -> Result<(), RenderError> {
        std::fs::write(path, self.to_html())?;
        log::info!("Map saved to {}", path.display());
        Ok(())
    }
}

fn write_element(script: &mut String, element: &Element) {
    match element {
        Element::Rectangle {
            south,
            west,
            north,
            east,
            color,
            fill_opacity,
            popup,
        } => {
            let _ = write!(
                script,
                "L.rectangle([[{south}, {west}], [{north}, {east}]], \
                 {{ color: {color}, fillColor: {color}, fill: true, fillOpacity: {fill_opacity}, weight: 1 }})",
                color = js_string(color),
            );
            finish_layer(script, popup.as_deref());
        }
        Element::CircleMarker {
            center,
            radius,
            color,
            fill_opacity,
            popup,
        } => {
            let _ = write!(
                script,
                "L.circleMarker([{}, {}], \
                 {{ radius: {radius}, color: {color}, fillColor: {color}, fill: true, fillOpacity: {fill_opacity} }})",
                center.latitude,
                center.longitude,
                color = js_string(color),
            );
            finish_layer(script, popup.as_deref());
        }
        Element::Marker { location, popup } => {
            let _ = write!(
                script,
                "L.marker([{}, {}])",
                location.latitude, location.longitude
            );
            finish_layer(script, popup.as_deref());
        }
        Element::GeoJsonLayer {
            geojson,
            fill_color,
            line_color,
            weight,
            fill_opacity,
            popup_property,
        } => {
            let on_each = popup_property.as_ref().map_or_else(String::new, |prop| {
                format!(
                    ", onEachFeature: function (feature, layer) {{ \
                     if (feature.properties && feature.properties[{prop}] !== undefined) \
                     {{ layer.bindPopup(String(feature.properties[{prop}])); }} }}",
                    prop = js_string(prop)
                )
            });
            let _ = writeln!(
                script,
                "L.geoJSON({geojson}, {{ style: {{ fillColor: {fill}, color: {line}, weight: {weight}, fillOpacity: {fill_opacity} }}{on_each} }}).addTo(map);",
                fill = js_string(fill_color),
                line = js_string(line_color),
            );
        }
    }
}

fn finish_layer(script: &mut String, popup: Option<&str>) {
    if let Some(popup) = popup {
        let _ = write!(script, ".bindPopup({})", js_string(popup));
    }
    let _ = writeln!(script, ".addTo(map);");
}

/// Encodes a string as a JS string literal (JSON is a JS subset).
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brussels_center() -> GeoPoint {
        GeoPoint {
            latitude: 50.8503,
            longitude: 4.3517,
        }
    }

    #[test]
    fn emits_map_initialization_and_tiles() {
        let map = MapBuilder::new("Demand", brussels_center(), 13)
            .with_tiles(TileLayer::CartoDbPositron);
        let html = map.to_html();

        assert!(html.contains("L.map('map').setView([50.8503, 4.3517], 13)"));
        assert!(html.contains("basemaps.cartocdn.com"));
        assert!(html.contains("<title>Demand</title>"));
    }

    #[test]
    fn rectangle_carries_color_and_popup() {
        let mut map = MapBuilder::new("Grid", brussels_center(), 13);
        map.add_rectangle(
            50.79,
            4.31,
            50.80,
            4.32,
            "red",
            0.6,
            Some("Scooters: 120".to_string()),
        );
        let html = map.to_html();

        assert!(html.contains("L.rectangle([[50.79, 4.31], [50.8, 4.32]]"));
        assert!(html.contains("\"red\""));
        assert!(html.contains(".bindPopup(\"Scooters: 120\")"));
    }

    #[test]
    fn popup_text_is_escaped_as_a_js_literal() {
        let mut map = MapBuilder::new("Stations", brussels_center(), 12);
        map.add_circle_marker(
            brussels_center(),
            4,
            "blue",
            0.7,
            Some("Gare de l'Ouest \"B\"".to_string()),
        );
        let html = map.to_html();

        assert!(html.contains(r#"Gare de l'Ouest \"B\""#));
    }

    #[test]
    fn geojson_layer_binds_popups_to_the_name_property() {
        let mut map = MapBuilder::new("Municipalities", brussels_center(), 12);
        map.add_geojson_layer(
            r#"{"type":"FeatureCollection","features":[]}"#,
            "blue",
            "black",
            1,
            0.5,
            Some("name_fr".to_string()),
        );
        let html = map.to_html();

        assert!(html.contains("L.geoJSON("));
        assert!(html.contains("feature.properties[\"name_fr\"]"));
    }
}
