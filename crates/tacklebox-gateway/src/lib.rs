//! HTTP gateway for the tacklebox fishing companion backend.
//!
//! This crate provides the public-facing API. It handles:
//!
//! - Login: Firebase ID token in, 90-day session token out
//! - A request gate checking session tokens on protected routes
//! - Fish identification from uploaded photos
//! - Weather, storm alerts and forecasts for a place
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Clients                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     tacklebox-gateway                       │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │   /auth     │ │ Request     │ │  /fish  /weather    │    │
//! │  │   login     │ │ gate        │ │  handlers           │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!               │                              │
//!               ▼                              ▼
//!        ┌──────────────┐         ┌─────────────────────────┐
//!        │ Firebase     │         │ Fishial / Open-Meteo    │
//!        │ JWKS         │         │                         │
//!        └──────────────┘         └─────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tacklebox_auth::{AuthConfig, FirebaseVerifier, SessionKeys, SessionSecret};
//! use tacklebox_gateway::{create_router, GatewayConfig, GatewayState};
//! use tacklebox_upstream::{FishialClient, FishialConfig, OpenMeteoClient, OpenMeteoConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let timeout = Duration::from_secs(30);
//! let state = GatewayState::new(
//!     Arc::new(FirebaseVerifier::new(AuthConfig::default())),
//!     Arc::new(SessionKeys::new(&SessionSecret::generate()?)),
//!     Arc::new(FishialClient::new(FishialConfig::default(), timeout)),
//!     Arc::new(OpenMeteoClient::new(OpenMeteoConfig::default(), timeout)),
//!     GatewayConfig::default(),
//! );
//!
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, GatewayConfig, ServerConfig, UpstreamEndpoints};
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;

// Re-export key types for convenience
pub use auth::AuthUser;
