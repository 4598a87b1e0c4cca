//! Weather endpoint.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use tacklebox_auth::IdentityVerifier;
use tacklebox_upstream::{
    build_report, Coordinates, FishRecognizer, ForecastProvider, Geocoder, WeatherReport,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::GatewayState;

/// Query parameters for `GET /weather`.
///
/// Either `location` or both coordinates must be present; `location` wins
/// when both are given.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    /// A place name to geocode.
    pub location: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<String>,
    /// Longitude in degrees.
    pub longitude: Option<String>,
    /// IANA timezone for coordinate lookups.
    pub timezone: Option<String>,
}

/// Current conditions, storm alerts and a 14-day forecast.
///
/// ```text
/// GET /weather?location=Lake%20Placid
/// GET /weather?latitude=44.28&longitude=-73.98&timezone=America/New_York
/// ```
///
/// # Errors
///
/// Returns 400 if the place cannot be determined and 500 if the forecast
/// cannot be fetched.
pub async fn weather<V, F, W>(
    State(state): State<Arc<GatewayState<V, F, W>>>,
    user: AuthUser,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherReport>, ApiError>
where
    V: IdentityVerifier + 'static,
    F: FishRecognizer + 'static,
    W: Geocoder + ForecastProvider + 'static,
{
    let location = non_empty(query.location);
    let coordinates = match (&location, non_empty(query.latitude), non_empty(query.longitude)) {
        (Some(location), _, _) => state.weather.geocode(location).await?,
        (None, Some(latitude), Some(longitude)) => Coordinates {
            latitude: parse_degrees("latitude", &latitude, 90.0)?,
            longitude: parse_degrees("longitude", &longitude, 180.0)?,
            timezone: non_empty(query.timezone)
                .unwrap_or_else(|| state.config.default_timezone.clone()),
        },
        _ => return Err(ApiError::BadRequest("Missing details".to_string())),
    };

    tracing::debug!(
        subject = %user.subject_id,
        latitude = coordinates.latitude,
        longitude = coordinates.longitude,
        timezone = %coordinates.timezone,
        "Weather requested"
    );

    let forecast = state.weather.forecast(&coordinates).await?;
    let report = build_report(location, coordinates, &forecast)?;

    Ok(Json(report))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_degrees(name: &str, raw: &str, limit: f64) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid {name}: {raw}")))
}
