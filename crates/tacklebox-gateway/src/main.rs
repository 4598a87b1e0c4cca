//! Tacklebox Gateway
//!
//! This is the main entry point for the gateway service. All settings come
//! from environment variables; see [`ServerConfig`].
//!
//! # Dev Mode
//!
//! Build with `--features dev-mode` to use a mock identity verifier that
//! doesn't require network access to Google. Log in with assertions in the
//! format `test-assertion:<uid>`.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "dev-mode")]
use tacklebox_auth::MockIdentityVerifier;
#[cfg(not(feature = "dev-mode"))]
use tacklebox_auth::FirebaseVerifier;
use tacklebox_auth::{SessionKeys, SessionSecret};
use tacklebox_gateway::{create_router, GatewayState, ServerConfig};
use tacklebox_upstream::{FishialClient, OpenMeteoClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tacklebox=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tacklebox Gateway");

    let config = ServerConfig::from_env()?;
    let listen_addr = config.gateway.listen_addr.clone();

    tracing::info!(
        listen_addr = %listen_addr,
        firebase_project = %config.auth.project_id,
        fishial_api = %config.fishial.api_url,
        forecast_api = %config.open_meteo.forecast_url,
        upstream_timeout = ?config.upstream_timeout,
        "Gateway configuration loaded"
    );

    // Session secret
    let secret = match config.session_secret.as_deref() {
        Some(encoded) => SessionSecret::from_base64(encoded)?,
        None => {
            tracing::warn!(
                "No SESSION_SECRET set - using a random per-process secret; \
                 sessions will not survive a restart"
            );
            SessionSecret::generate()?
        }
    };
    let session_keys = Arc::new(SessionKeys::new(&secret));

    // Initialize identity verifier
    #[cfg(feature = "dev-mode")]
    let identity = {
        tracing::warn!("DEV MODE ENABLED - using mock identity verifier");
        tracing::warn!("Use assertions in format: test-assertion:<uid>");
        Arc::new(MockIdentityVerifier)
    };

    #[cfg(not(feature = "dev-mode"))]
    let identity = {
        if config.auth.project_id.is_empty() {
            tracing::warn!("No FIREBASE_PROJECT_ID set - every login will be rejected");
        }
        Arc::new(FirebaseVerifier::new(config.auth.clone()))
    };
    tracing::info!("Identity verifier initialized");

    // Upstream adapters
    if config.fishial.client_id.is_empty() {
        tracing::warn!("No FISHIAL_CLIENT_ID set - fish identification will fail");
    }
    let fish = Arc::new(FishialClient::new(
        config.fishial.clone(),
        config.upstream_timeout,
    ));
    let weather = Arc::new(OpenMeteoClient::new(
        config.open_meteo.clone(),
        config.upstream_timeout,
    ));

    let state = GatewayState::new(identity, session_keys, fish, weather, config.gateway);

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
