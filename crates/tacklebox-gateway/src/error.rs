//! API error types and responses.
//!
//! Every failure is rendered as `{"error": "<message>"}`. The message is the
//! `Display` text of the variant, so it doubles as the client contract.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use tacklebox_auth::{AuthError, TokenError};
use tacklebox_upstream::UpstreamError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable `Authorization: Bearer` header on a protected route.
    #[error("Authorization header missing")]
    MissingCredentials,

    /// The session token was rejected.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The identity assertion presented at login was rejected.
    #[error("Invalid Firebase token")]
    IdentityRejected,

    /// Invalid request body or parameters.
    #[error("{0}")]
    BadRequest(String),

    /// A third-party service failed; the message is passed through.
    #[error("{0}")]
    Upstream(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials | Self::Token(_) | Self::IdentityRejected => {
                StatusCode::UNAUTHORIZED
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::Token(TokenError::Expired) => "token_expired",
            Self::Token(TokenError::Malformed) => "invalid_token",
            Self::IdentityRejected => "identity_rejected",
            Self::BadRequest(_) => "bad_request",
            Self::Upstream(_) => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!(status = status.as_u16(), code = self.code(), "Request failed");

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.http_status_code() == 401 {
            Self::IdentityRejected
        } else {
            tracing::error!(error = %err, "Auth internal error");
            Self::Internal("authentication service error".to_string())
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Upstream(err.to_string())
        }
    }
}
