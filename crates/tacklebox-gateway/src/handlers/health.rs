//! Liveness endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tacklebox_auth::{IdentityVerifier, SESSION_TTL_DAYS};
use tacklebox_upstream::{FishRecognizer, ForecastProvider, Geocoder};

use crate::config::UpstreamEndpoints;
use crate::state::GatewayState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the process answers.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Lifetime of issued session tokens.
    pub session_ttl_days: i64,
    /// Outbound endpoints this instance talks to.
    pub upstreams: UpstreamEndpoints,
}

/// Report liveness and the configured upstreams. Public.
///
/// Nothing is contacted; an unreachable upstream still reports healthy.
pub async fn health<V, F, W>(
    State(state): State<Arc<GatewayState<V, F, W>>>,
) -> Json<HealthResponse>
where
    V: IdentityVerifier + 'static,
    F: FishRecognizer + 'static,
    W: Geocoder + ForecastProvider + 'static,
{
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        session_ttl_days: SESSION_TTL_DAYS,
        upstreams: state.config.upstreams.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;

    #[tokio::test]
    async fn reports_configured_upstreams() {
        let mut state = test_state();
        state.config.upstreams.forecast = "http://meteo.local/forecast".to_string();

        let Json(body) = health(State(Arc::new(state))).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.session_ttl_days, 90);
        assert_eq!(body.upstreams.forecast, "http://meteo.local/forecast");
        assert_eq!(body.upstreams.geocoding, UpstreamEndpoints::default().geocoding);
    }
}
