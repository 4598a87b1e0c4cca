//! Gateway configuration types.
//!
//! [`GatewayConfig`] covers the HTTP server itself. [`ServerConfig`] is the
//! full set of settings the binary loads once from the environment at
//! startup, including the outbound service settings.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use tacklebox_auth::{AuthConfig, FIREBASE_JWKS_URL};
use tacklebox_upstream::{
    FishialConfig, OpenMeteoConfig, FISHIAL_API_URL, FISHIAL_AUTH_URL, FORECAST_URL, GEOCODING_URL,
};

/// Configuration for the gateway service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:5001").
    pub listen_addr: String,

    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Timezone used for coordinate lookups that do not name one.
    pub default_timezone: String,

    /// Outbound endpoints, reported by the health check.
    pub upstreams: UpstreamEndpoints,
}

impl GatewayConfig {
    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5001".to_string(),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: 16 * 1024 * 1024, // 16 MiB, enough for phone photos
            request_timeout_seconds: 60,
            default_timezone: "America/New_York".to_string(),
            upstreams: UpstreamEndpoints::default(),
        }
    }
}

/// Where the gateway sends its outbound calls. Credentials are not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamEndpoints {
    /// Firebase signing keys.
    pub identity_keys: String,
    /// Fishial recognition API.
    pub fish_recognition: String,
    /// Open-Meteo geocoding.
    pub geocoding: String,
    /// Open-Meteo forecast.
    pub forecast: String,
}

impl UpstreamEndpoints {
    fn from_configs(
        auth: &AuthConfig,
        fishial: &FishialConfig,
        open_meteo: &OpenMeteoConfig,
    ) -> Self {
        Self {
            identity_keys: auth.jwks_url.clone(),
            fish_recognition: fishial.api_url.clone(),
            geocoding: open_meteo.geocoding_url.clone(),
            forecast: open_meteo.forecast_url.clone(),
        }
    }
}

impl Default for UpstreamEndpoints {
    fn default() -> Self {
        Self {
            identity_keys: FIREBASE_JWKS_URL.to_string(),
            fish_recognition: FISHIAL_API_URL.to_string(),
            geocoding: GEOCODING_URL.to_string(),
            forecast: FORECAST_URL.to_string(),
        }
    }
}

/// An environment variable held a value that could not be used.
#[derive(Debug, Error)]
#[error("invalid value for {key}: {value:?} ({reason})")]
pub struct ConfigError {
    /// The variable name.
    pub key: &'static str,
    /// The offending value.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server settings.
    pub gateway: GatewayConfig,
    /// Firebase verification settings.
    pub auth: AuthConfig,
    /// Base64 session secret, if one is configured.
    pub session_secret: Option<String>,
    /// Fishial endpoints and credentials.
    pub fishial: FishialConfig,
    /// Open-Meteo endpoints.
    pub open_meteo: OpenMeteoConfig,
    /// Per-call timeout for Fishial and Open-Meteo requests.
    pub upstream_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric setting cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = GatewayConfig::default();

        let mut gateway = GatewayConfig {
            listen_addr: get("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            cors_origins: get("CORS_ORIGINS").map_or(defaults.cors_origins, |v| {
                v.split(',').map(|o| o.trim().to_string()).collect()
            }),
            max_body_bytes: parse_or(&get, "MAX_BODY_BYTES", defaults.max_body_bytes)?,
            request_timeout_seconds: parse_or(
                &get,
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            )?,
            default_timezone: get("DEFAULT_TIMEZONE").unwrap_or(defaults.default_timezone),
            upstreams: defaults.upstreams,
        };

        let auth_defaults = AuthConfig::default();
        let auth = AuthConfig {
            project_id: get("FIREBASE_PROJECT_ID").unwrap_or_default(),
            jwks_url: get("FIREBASE_JWKS_URL").unwrap_or_else(|| FIREBASE_JWKS_URL.to_string()),
            jwks_refresh_seconds: parse_or(
                &get,
                "JWKS_REFRESH_SECONDS",
                auth_defaults.jwks_refresh_seconds,
            )?,
            request_timeout_seconds: auth_defaults.request_timeout_seconds,
        };

        let fishial = FishialConfig {
            auth_url: get("FISHIAL_AUTH_URL").unwrap_or_else(|| FISHIAL_AUTH_URL.to_string()),
            api_url: get("FISHIAL_API_URL").unwrap_or_else(|| FISHIAL_API_URL.to_string()),
            client_id: get("FISHIAL_CLIENT_ID").unwrap_or_default(),
            client_secret: get("FISHIAL_CLIENT_SECRET").unwrap_or_default(),
        };

        let open_meteo = OpenMeteoConfig {
            geocoding_url: get("GEOCODING_URL").unwrap_or_else(|| GEOCODING_URL.to_string()),
            forecast_url: get("FORECAST_URL").unwrap_or_else(|| FORECAST_URL.to_string()),
        };

        gateway.upstreams = UpstreamEndpoints::from_configs(&auth, &fishial, &open_meteo);

        Ok(Self {
            gateway,
            auth,
            session_secret: get("SESSION_SECRET"),
            fishial,
            open_meteo,
            upstream_timeout: Duration::from_secs(parse_or(&get, "UPSTREAM_TIMEOUT_SECONDS", 30)?),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
