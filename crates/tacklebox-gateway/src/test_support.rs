//! Stub services for router tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use tacklebox_auth::{MockIdentityVerifier, SessionKeys, SessionSecret};
use tacklebox_upstream::{
    extract_fish_details, Coordinates, FishRecognizer, ForecastProvider, ForecastResponse,
    Geocoder, Identification, ImageUpload, Result, UpstreamError,
};

use crate::config::GatewayConfig;
use crate::state::GatewayState;

/// Recognizes every photo as a largemouth bass, except for two magic names.
pub struct StubRecognizer;

impl StubRecognizer {
    pub const UNKNOWN_FILENAME: &'static str = "empty-lake.jpg";
    pub const FAILING_FILENAME: &'static str = "broken-upload.jpg";
}

#[async_trait]
impl FishRecognizer for StubRecognizer {
    async fn identify(&self, image: &ImageUpload) -> Result<Option<Identification>> {
        match image.filename.as_str() {
            Self::UNKNOWN_FILENAME => Ok(None),
            Self::FAILING_FILENAME => Err(UpstreamError::Upload),
            _ => Ok(Some(Identification {
                confidence: 0.91,
                details: extract_fish_details(&json!({
                    "fishangler-data": { "title": "Largemouth Bass" }
                })),
            })),
        }
    }
}

/// Geocodes everything to Lake Placid and serves a two-day forecast.
pub struct StubWeather;

impl StubWeather {
    pub const BROKEN_TIMEZONE: &'static str = "Etc/Broken";
}

#[async_trait]
impl Geocoder for StubWeather {
    async fn geocode(&self, location: &str) -> Result<Coordinates> {
        if location == "Unknown Place" {
            return Err(UpstreamError::LocationNotFound(location.to_string()));
        }
        Ok(Coordinates {
            latitude: 44.28,
            longitude: -73.98,
            timezone: "America/New_York".to_string(),
        })
    }
}

#[async_trait]
impl ForecastProvider for StubWeather {
    async fn forecast(&self, coordinates: &Coordinates) -> Result<ForecastResponse> {
        if coordinates.timezone == Self::BROKEN_TIMEZONE {
            return Err(UpstreamError::Forecast("upstream unavailable".to_string()));
        }
        serde_json::from_value(json!({
            "hourly": {
                "time": ["2026-10-18T00:00", "2026-10-18T01:00"],
                "temperature_2m": [7.5, 7.1],
                "wind_speed_10m": [5.0, 4.0],
                "wind_direction_10m": [270, 260],
                "precipitation": [0.0, 0.0],
                "weather_code": [1, 2]
            },
            "daily": {
                "time": ["2026-10-18", "2026-10-19"],
                "temperature_2m_max": [12.0, 13.0],
                "temperature_2m_min": [3.0, 4.0],
                "wind_speed_10m_max": [15.0, 10.0],
                "wind_direction_10m_dominant": [265, 250],
                "sunrise": ["2026-10-18T07:12", "2026-10-19T07:13"],
                "sunset": ["2026-10-18T18:09", "2026-10-19T18:07"],
                "precipitation_sum": [0.0, 2.0],
                "weather_code": [2, 61]
            }
        }))
        .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }
}

/// Gateway state wired to the stubs and a fresh session secret.
pub fn test_state() -> GatewayState<MockIdentityVerifier, StubRecognizer, StubWeather> {
    GatewayState::new(
        Arc::new(MockIdentityVerifier),
        Arc::new(SessionKeys::new(&SessionSecret::generate().unwrap())),
        Arc::new(StubRecognizer),
        Arc::new(StubWeather),
        GatewayConfig::default(),
    )
}
