//! Authentication error types.

use tacklebox_core::IdError;
use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while verifying identity assertions or managing secrets.
///
/// Callers of [`IdentityVerifier`](crate::IdentityVerifier) only ever see
/// [`AuthError::IdentityRejected`]; the detailed variants are produced while
/// checking an assertion and end up in the logs.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity assertion could not be verified.
    #[error("identity assertion rejected")]
    IdentityRejected,

    /// The identity assertion failed a specific check.
    #[error("invalid identity assertion: {0}")]
    InvalidAssertion(String),

    /// The subject carried by a token is not a valid identifier.
    #[error("invalid subject: {0}")]
    InvalidSubject(#[from] IdError),

    /// Failed to fetch the JWK set from the identity provider.
    #[error("JWKS fetch failed: {0}")]
    JwksFetchFailed(String),

    /// The key ID specified in the assertion was not found.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The configured session secret is unusable.
    #[error("invalid session secret: {0}")]
    InvalidSecret(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::IdentityRejected
            | Self::InvalidAssertion(_)
            | Self::InvalidSubject(_)
            | Self::KeyNotFound(_) => 401,
            Self::JwksFetchFailed(_) | Self::InvalidSecret(_) | Self::Internal(_) => 500,
        }
    }
}

/// Errors produced when verifying a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token was well formed and correctly signed but is past its expiry.
    #[error("Token expired")]
    Expired,

    /// The token could not be decoded or its signature did not match.
    #[error("Invalid token")]
    Malformed,
}
