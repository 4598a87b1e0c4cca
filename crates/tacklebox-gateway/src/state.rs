//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use tacklebox_auth::{IdentityVerifier, SessionKeys};
use tacklebox_upstream::{FishRecognizer, ForecastProvider, Geocoder};

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
///
/// This struct holds references to all services needed by the HTTP handlers.
/// Nothing in it is mutated after startup.
pub struct GatewayState<V, F, W>
where
    V: IdentityVerifier,
    F: FishRecognizer,
    W: Geocoder + ForecastProvider,
{
    /// Verifier for identity assertions presented at login.
    pub identity: Arc<V>,
    /// Issues and verifies session tokens.
    pub session_keys: Arc<SessionKeys>,
    /// Fish recognition service.
    pub fish: Arc<F>,
    /// Geocoding and forecast service.
    pub weather: Arc<W>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<V, F, W> GatewayState<V, F, W>
where
    V: IdentityVerifier,
    F: FishRecognizer,
    W: Geocoder + ForecastProvider,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(
        identity: Arc<V>,
        session_keys: Arc<SessionKeys>,
        fish: Arc<F>,
        weather: Arc<W>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            identity,
            session_keys,
            fish,
            weather,
            config,
        }
    }
}
