//! HTTP client for the Brussels Mobility Twin API.
//!
//! Two endpoints are consumed: per-provider vehicle position snapshots
//! (`/{provider}/vehicle-position?timestamp=...`, a `GeoJSON`
//! `FeatureCollection`) and city-level weather observations
//! (`/environment/weather?timestamp=...`). Both take a unix timestamp
//! and a bearer token.

use chrono::{DateTime, Utc};
use scooter_grid_models::{GeoPoint, ScooterObservation, WeatherObservation};
use serde::Deserialize;

use crate::FetchError;

/// Production endpoint of the Mobility Twin API.
pub const DEFAULT_BASE_URL: &str = "https://api.mobilitytwin.brussels";

/// Authenticated client for the Mobility Twin API.
pub struct MobilityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MobilityClient {
    /// Creates a client against the production endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Creates a client against a custom endpoint (used by tests).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetches the vehicle position snapshot of one provider at one
    /// timestamp.
    ///
    /// Features whose geometry is missing or malformed are dropped with
    /// a warning rather than failing the whole snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails, the API answers
    /// with a non-success status, or the body is not a `GeoJSON`
    /// `FeatureCollection`.
    pub async fn vehicle_positions(
        &self,
        provider: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<ScooterObservation>, FetchError> {
        let url = format!(
            "{}/{provider}/vehicle-position?timestamp={}",
            self.base_url,
            timestamp.timestamp()
        );

        let resp = self.http.get(&url).bearer_auth(&self.api_key).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_feature_collection(&body, provider, timestamp)
    }

    /// Fetches the weather observation for one timestamp, flattened to
    /// the CSV schema.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails, the API answers
    /// with a non-success status, or a required field is absent from
    /// the response.
    pub async fn weather(
        &self,
        timestamp: DateTime<Utc>,
    ) -> Result<WeatherObservation, FetchError> {
        let url = format!(
            "{}/environment/weather?timestamp={}",
            self.base_url,
            timestamp.timestamp()
        );

        let resp = self.http.get(&url).bearer_auth(&self.api_key).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status(),
            });
        }

        let body: WeatherResponse = serde_json::from_value(resp.json().await?)?;
        Ok(flatten_weather(timestamp, body))
    }
}

/// Extracts point features from a `GeoJSON` `FeatureCollection` body.
fn parse_feature_collection(
    body: &serde_json::Value,
    provider: &str,
    timestamp: DateTime<Utc>,
) -> Result<Vec<ScooterObservation>, FetchError> {
    let features = body
        .get("features")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| FetchError::Parse {
            message: "response missing 'features' array".to_string(),
        })?;

    let mut observations = Vec::with_capacity(features.len());
    let mut dropped: u64 = 0;

    for feature in features {
        let coords = feature
            .get("geometry")
            .and_then(|g| g.get("coordinates"))
            .and_then(serde_json::Value::as_array);

        // GeoJSON coordinate order is (lon, lat).
        let point = coords.and_then(|c| {
            let longitude = c.first()?.as_f64()?;
            let latitude = c.get(1)?.as_f64()?;
            GeoPoint::checked(latitude, longitude)
        });

        match point {
            Some(point) => observations.push(ScooterObservation {
                provider: provider.to_string(),
                timestamp,
                point,
            }),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::warn!("[{provider}] Dropped {dropped} features without usable geometry");
    }

    Ok(observations)
}

#[derive(Deserialize)]
struct WeatherResponse {
    coord: Coord,
    main: MainBlock,
    weather: Vec<Condition>,
    wind: Wind,
    clouds: Clouds,
    visibility: f64,
    sys: Sys,
}

#[derive(Deserialize)]
struct Coord {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Deserialize)]
struct Condition {
    main: String,
    description: String,
}

#[derive(Deserialize)]
struct Wind {
    speed: f64,
    deg: f64,
}

#[derive(Deserialize)]
struct Clouds {
    all: f64,
}

#[derive(Deserialize)]
struct Sys {
    sunrise: i64,
    sunset: i64,
}

fn format_unix_time(unix: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix, 0)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

fn flatten_weather(timestamp: DateTime<Utc>, body: WeatherResponse) -> WeatherObservation {
    let condition = body.weather.into_iter().next();

    WeatherObservation {
        date: timestamp.format("%Y-%m-%d %H:%M").to_string(),
        lat: body.coord.lat,
        lon: body.coord.lon,
        temp: body.main.temp,
        feels_like: body.main.feels_like,
        temp_min: body.main.temp_min,
        temp_max: body.main.temp_max,
        pressure: body.main.pressure,
        humidity: body.main.humidity,
        weather_main: condition.as_ref().map(|c| c.main.clone()).unwrap_or_default(),
        weather_desc: condition.map(|c| c.description).unwrap_or_default(),
        wind_speed: body.wind.speed,
        wind_deg: body.wind.deg,
        clouds_all: body.clouds.all,
        visibility: body.visibility,
        sunrise: format_unix_time(body.sys.sunrise),
        sunset: format_unix_time(body.sys.sunset),
    }
}
