//! Third-party service adapters for tacklebox.
//!
//! This crate wraps the two outside services the backend depends on:
//!
//! - Fishial, for identifying fish species in photos
//! - Open-Meteo, for geocoding place names and fetching forecasts
//!
//! Each service sits behind an async trait ([`FishRecognizer`], [`Geocoder`],
//! [`ForecastProvider`]) so the gateway can swap in fakes under test. The
//! pure reshaping code ([`extract_fish_details`], [`build_report`],
//! [`interpret_storm_alert`]) has no I/O and is usable on its own.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tacklebox_upstream::{
//!     build_report, ForecastProvider, Geocoder, OpenMeteoClient, OpenMeteoConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenMeteoClient::new(OpenMeteoConfig::default(), Duration::from_secs(30));
//!
//! let place = client.geocode("Lake Placid").await?;
//! let forecast = client.forecast(&place).await?;
//! let report = build_report(Some("Lake Placid".to_string()), place, &forecast)?;
//! println!("{}", report.storm_alert);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::time::Duration;

pub mod error;
pub mod fish;
pub mod fish_details;
pub mod report;
pub mod storm;
pub mod weather;

pub use error::{Result, UpstreamError};
pub use fish::{FishRecognizer, FishialClient, Identification, ImageUpload};
pub use fish_details::{extract_fish_details, FishDetails};
pub use report::{build_report, WeatherReport};
pub use storm::{interpret_storm_alert, StormAlert};
pub use weather::{Coordinates, ForecastProvider, ForecastResponse, Geocoder, OpenMeteoClient};

/// Default base URL for Fishial authentication.
pub const FISHIAL_AUTH_URL: &str = "https://api-users.fishial.ai";

/// Default base URL for the Fishial recognition API.
pub const FISHIAL_API_URL: &str = "https://api.fishial.ai";

/// Default base URL for Open-Meteo geocoding.
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

/// Default base URL for Open-Meteo forecasts.
pub const FORECAST_URL: &str = "https://api.open-meteo.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the Fishial client.
#[derive(Clone)]
pub struct FishialConfig {
    /// Base URL of the token endpoint host.
    pub auth_url: String,
    /// Base URL of the recognition API host.
    pub api_url: String,
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

impl Default for FishialConfig {
    fn default() -> Self {
        Self {
            auth_url: FISHIAL_AUTH_URL.to_string(),
            api_url: FISHIAL_API_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

impl std::fmt::Debug for FishialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FishialConfig")
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for the Open-Meteo client.
#[derive(Debug, Clone)]
pub struct OpenMeteoConfig {
    /// Base URL of the geocoding API.
    pub geocoding_url: String,
    /// Base URL of the forecast API.
    pub forecast_url: String,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            geocoding_url: GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
        }
    }
}

/// Build the shared reqwest client used by every adapter.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built (should never happen with valid config).
pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .build()
        .expect("failed to build HTTP client")
}
