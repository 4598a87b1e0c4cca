//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use tacklebox_auth::IdentityVerifier;
use tacklebox_upstream::{FishRecognizer, ForecastProvider, Geocoder};

use crate::auth::require_session;
use crate::handlers::{auth, fish, health, weather};
use crate::state::GatewayState;

type SharedState<V, F, W> = Arc<GatewayState<V, F, W>>;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /auth/login` - Exchange a Firebase ID token for a session token
///
/// ## Protected (session token required)
/// - `POST /fish/identify` - Identify the fish in an uploaded photo
/// - `GET /weather` - Conditions, storm alerts and forecast for a place
pub fn create_router<V, F, W>(state: GatewayState<V, F, W>) -> Router
where
    V: IdentityVerifier + 'static,
    F: FishRecognizer + 'static,
    W: Geocoder + ForecastProvider + 'static,
{
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);
    let gate = middleware::from_fn_with_state(Arc::clone(&state), require_session::<V, F, W>);

    Router::new()
        .route("/health", get(health::health::<V, F, W>))
        .merge(auth_routes())
        .merge(fish_routes().route_layer(gate.clone()))
        .merge(weather_routes().route_layer(gate))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

fn auth_routes<V, F, W>() -> Router<SharedState<V, F, W>>
where
    V: IdentityVerifier + 'static,
    F: FishRecognizer + 'static,
    W: Geocoder + ForecastProvider + 'static,
{
    Router::new().route("/auth/login", post(auth::login::<V, F, W>))
}

fn fish_routes<V, F, W>() -> Router<SharedState<V, F, W>>
where
    V: IdentityVerifier + 'static,
    F: FishRecognizer + 'static,
    W: Geocoder + ForecastProvider + 'static,
{
    Router::new().route("/fish/identify", post(fish::identify::<V, F, W>))
}

fn weather_routes<V, F, W>() -> Router<SharedState<V, F, W>>
where
    V: IdentityVerifier + 'static,
    F: FishRecognizer + 'static,
    W: Geocoder + ForecastProvider + 'static,
{
    Router::new().route("/weather", get(weather::weather::<V, F, W>))
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
