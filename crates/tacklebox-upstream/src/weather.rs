//! Geocoding and forecast lookups against Open-Meteo.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UpstreamError};
use crate::{build_http_client, OpenMeteoConfig};

const HOURLY_VARIABLES: &str =
    "temperature_2m,wind_speed_10m,wind_direction_10m,precipitation,weather_code";
const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min,wind_speed_10m_max,\
wind_direction_10m_dominant,sunrise,sunset,precipitation_sum,weather_code";

/// Number of forecast days requested.
pub const FORECAST_DAYS: usize = 14;

/// A resolved place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// IANA timezone name used for local times.
    pub timezone: String,
}

/// Trait for resolving place names to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::LocationNotFound`] when nothing matches and
    /// [`UpstreamError::Geocoding`] when the lookup itself fails.
    async fn geocode(&self, location: &str) -> Result<Coordinates>;
}

/// Trait for fetching hourly and daily forecasts.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the forecast for a place.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Forecast`] when the request fails.
    async fn forecast(&self, coordinates: &Coordinates) -> Result<ForecastResponse>;
}

/// Hourly series as returned by Open-Meteo.
#[derive(Debug, Clone, Default, Deserialize)]
#[allow(missing_docs)]
pub struct HourlySeries {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
}

/// Daily series as returned by Open-Meteo.
#[derive(Debug, Clone, Default, Deserialize)]
#[allow(missing_docs)]
pub struct DailySeries {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction_10m_dominant: Vec<Option<f64>>,
    #[serde(default)]
    pub sunrise: Vec<String>,
    #[serde(default)]
    pub sunset: Vec<String>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
}

/// Forecast payload as returned by Open-Meteo.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    /// Hour-by-hour values.
    pub hourly: HourlySeries,
    /// Day-by-day values.
    pub daily: DailySeries,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timezone: Option<String>,
}

/// HTTP client for the Open-Meteo geocoding and forecast APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoClient {
    /// Create a new Open-Meteo client with a per-request timeout.
    #[must_use]
    pub fn new(config: OpenMeteoConfig, timeout: Duration) -> Self {
        Self {
            client: build_http_client(timeout),
            config,
        }
    }

    /// Create a new Open-Meteo client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: OpenMeteoConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    async fn geocode(&self, location: &str) -> Result<Coordinates> {
        let url = format!("{}/v1/search", self.config.geocoding_url);

        let response = self
            .client
            .get(&url)
            .query(&[("name", location), ("count", "1"), ("format", "json")])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| UpstreamError::Geocoding(e.to_string()))?;

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Geocoding(e.to_string()))?;

        let best = body
            .results
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| UpstreamError::LocationNotFound(location.to_string()))?;

        tracing::debug!(
            location = %location,
            latitude = best.latitude,
            longitude = best.longitude,
            "Resolved location"
        );

        Ok(Coordinates {
            latitude: best.latitude,
            longitude: best.longitude,
            timezone: best.timezone.unwrap_or_else(|| "auto".to_string()),
        })
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn forecast(&self, coordinates: &Coordinates) -> Result<ForecastResponse> {
        let url = format!("{}/v1/forecast", self.config.forecast_url);
        let forecast_days = FORECAST_DAYS.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("daily", DAILY_VARIABLES.to_string()),
                ("timezone", coordinates.timezone.clone()),
                ("forecast_days", forecast_days),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                tracing::error!(error = %e, "Forecast request failed");
                UpstreamError::Forecast(e.to_string())
            })?;

        response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Forecast payload unreadable");
            UpstreamError::Forecast(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        OpenMeteoClient::new(
            OpenMeteoConfig {
                geocoding_url: server.uri(),
                forecast_url: server.uri(),
            },
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn geocode_takes_first_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Lake Placid"))
            .and(query_param("count", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "name": "Lake Placid", "latitude": 44.28, "longitude": -73.98, "timezone": "America/New_York" },
                    { "name": "Lake Placid", "latitude": 27.29, "longitude": -81.36, "timezone": "America/New_York" }
                ]
            })))
            .mount(&server)
            .await;

        let coords = client_for(&server).geocode("Lake Placid").await.unwrap();
        assert!((coords.latitude - 44.28).abs() < f64::EPSILON);
        assert_eq!(coords.timezone, "America/New_York");
    }

    #[tokio::test]
    async fn geocode_without_results_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generationtime_ms": 0.5 })))
            .mount(&server)
            .await;

        let err = client_for(&server).geocode("Unknown Place").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "No results found for location: Unknown Place"
        );
    }

    #[tokio::test]
    async fn geocode_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).geocode("Oslo").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Geocoding(_)));
        assert!(err.to_string().starts_with("Geocoding error: "));
    }

    #[tokio::test]
    async fn forecast_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "44.28"))
            .and(query_param("timezone", "America/New_York"))
            .and(query_param("forecast_days", "14"))
            .and(query_param("hourly", HOURLY_VARIABLES))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hourly": { "time": ["2026-10-18T00:00"], "temperature_2m": [7.5] },
                "daily": { "time": ["2026-10-18"], "sunrise": ["2026-10-18T07:12"], "sunset": ["2026-10-18T18:09"] }
            })))
            .mount(&server)
            .await;

        let forecast = client_for(&server)
            .forecast(&Coordinates {
                latitude: 44.28,
                longitude: -73.98,
                timezone: "America/New_York".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(forecast.hourly.temperature_2m, vec![Some(7.5)]);
        assert!(forecast.hourly.weather_code.is_empty());
    }

    #[tokio::test]
    async fn forecast_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": true })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .forecast(&Coordinates {
                latitude: 0.0,
                longitude: 0.0,
                timezone: "GMT".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Weather API error: "));
    }
}
