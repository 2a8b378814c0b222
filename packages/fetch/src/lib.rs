#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Mobility Twin API client and the sequential fetch loops.
//!
//! Fetching is strictly sequential with a fixed delay between
//! timestamps to respect the API's rate limits. There are no retries:
//! a failed unit of work is logged and skipped, and the loop moves on.
//! The collectors keep the aggregation pipeline fully decoupled from
//! fetch failure handling.

pub mod client;
pub mod plan;

pub use client::MobilityClient;
pub use plan::{
    FetchUnit, MobilityFetchPlan, PositionCollector, WeatherCollector, WeatherFetchPlan,
    run_mobility_fetch, run_weather_fetch,
};

use thiserror::Error;

/// Errors for a single fetch unit. Never aborts the surrounding loop.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-success status.
    #[error("API returned status {status}")]
    Status {
        /// The HTTP status code.
        status: reqwest::StatusCode,
    },

    /// The response parsed as JSON but is missing expected structure.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },
}
