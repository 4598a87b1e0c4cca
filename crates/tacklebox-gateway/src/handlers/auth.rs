//! Login endpoint.
//!
//! Exchanges a Firebase ID token for a session token.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use tacklebox_auth::IdentityVerifier;
use tacklebox_upstream::{FishRecognizer, ForecastProvider, Geocoder};

use crate::error::ApiError;
use crate::state::GatewayState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// The Firebase ID token obtained by the client.
    #[serde(default)]
    pub firebase_token: Option<String>,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The session token to send as `Authorization: Bearer <jwt>`.
    pub jwt: String,
}

/// Log in with a Firebase ID token.
///
/// The body is read as raw bytes so that an empty or malformed body is
/// reported the same way as a missing token.
///
/// ```text
/// POST /auth/login
/// {"firebase_token": "eyJhbGciOiJSUzI1NiIs..."}
///
/// Response: 200 OK
/// {"jwt": "eyJhbGciOiJIUzI1NiIs..."}
/// ```
///
/// # Errors
///
/// Returns 400 if no token was supplied and 401 if the token is rejected.
pub async fn login<V, F, W>(
    State(state): State<Arc<GatewayState<V, F, W>>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError>
where
    V: IdentityVerifier + 'static,
    F: FishRecognizer + 'static,
    W: Geocoder + ForecastProvider + 'static,
{
    let assertion = serde_json::from_slice::<LoginRequest>(&body)
        .ok()
        .and_then(|req| req.firebase_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing Firebase token".to_string()))?;

    let identity = state.identity.verify(&assertion).await?;
    let session = state.session_keys.issue(&identity.subject_id)?;

    tracing::info!(
        subject = %session.subject_id,
        expires_at = %session.expires_at,
        "Session issued"
    );

    Ok(Json(LoginResponse {
        jwt: session.token,
    }))
}
