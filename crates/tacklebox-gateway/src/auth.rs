//! Request gate and the authenticated-user extractor.
//!
//! Protected routes are wrapped in [`require_session`], which checks the
//! `Authorization: Bearer <token>` header against the session keys and stores
//! an [`AuthUser`] in the request extensions. Handlers then take `AuthUser`
//! as an extractor.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use tacklebox_auth::{IdentityVerifier, SessionKeys, VerifiedIdentity};
use tacklebox_core::SubjectId;
use tacklebox_upstream::{FishRecognizer, ForecastProvider, Geocoder};

use crate::error::ApiError;
use crate::state::GatewayState;

/// A user whose session token passed the request gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// The subject the session was issued to.
    pub subject_id: SubjectId,
}

impl From<VerifiedIdentity> for AuthUser {
    fn from(identity: VerifiedIdentity) -> Self {
        Self {
            subject_id: identity.subject_id,
        }
    }
}

/// Check the bearer token in `headers`.
///
/// # Errors
///
/// Returns [`ApiError::MissingCredentials`] if there is no `Bearer` header,
/// otherwise the session token error.
pub fn authenticate(headers: &HeaderMap, keys: &SessionKeys) -> Result<AuthUser, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::MissingCredentials)?;

    Ok(keys.verify(token)?.into())
}

/// Middleware guarding the protected route groups.
///
/// # Errors
///
/// Rejects the request with a 401 if [`authenticate`] fails.
pub async fn require_session<V, F, W>(
    State(state): State<Arc<GatewayState<V, F, W>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    V: IdentityVerifier + 'static,
    F: FishRecognizer + 'static,
    W: Geocoder + ForecastProvider + 'static,
{
    let user = authenticate(request.headers(), &state.session_keys).map_err(|e| {
        tracing::debug!(path = %request.uri().path(), reason = %e, "Request gate rejected");
        e
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(ApiError::MissingCredentials)
    }
}
