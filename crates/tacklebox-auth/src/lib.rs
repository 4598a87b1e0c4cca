//! Authentication for tacklebox.
//!
//! This crate provides the two halves of the login flow:
//!
//! - Firebase ID token verification (JWKS fetching and caching, RS256 checks)
//! - Session token issuance and verification (HS256, 90-day expiry)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   POST /auth/    │────▶│ IdentityVerifier │
//! │   login          │     │   (trait)        │
//! └────────┬─────────┘     └────────┬─────────┘
//!          │                        │
//!          │               ┌────────▼─────────┐
//!          │               │ FirebaseVerifier │──── HTTPS ───▶ Google JWKS
//!          │               └──────────────────┘
//!          ▼
//! ┌──────────────────┐
//! │   SessionKeys    │◀──── Request gate on protected routes
//! │ (issue / verify) │
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tacklebox_auth::{AuthConfig, FirebaseVerifier, IdentityVerifier, SessionKeys, SessionSecret};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let verifier = FirebaseVerifier::new(AuthConfig {
//!     project_id: "my-project".to_string(),
//!     ..AuthConfig::default()
//! });
//! let keys = SessionKeys::new(&SessionSecret::generate()?);
//!
//! let identity = verifier.verify("eyJhbGciOiJSUzI1NiIs...").await?;
//! let session = keys.issue(&identity.subject_id)?;
//!
//! let verified = keys.verify(&session.token)?;
//! assert_eq!(verified.subject_id, identity.subject_id);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::time::Duration;

pub mod error;
pub mod identity;
pub mod jwks;
pub mod session;

pub use error::{AuthError, Result, TokenError};
pub use identity::{FirebaseVerifier, IdentityVerifier, VerifiedIdentity};
pub use session::{SessionKeys, SessionSecret, SessionToken, SESSION_TTL_DAYS};

#[cfg(any(test, feature = "test-utils"))]
pub use identity::MockIdentityVerifier;

/// Google's JWK set for Firebase ID token signing keys.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Configuration for Firebase identity verification.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Firebase project ID; the expected `aud` claim.
    pub project_id: String,
    /// URL of the JWK set holding the signing keys.
    pub jwks_url: String,
    /// How often to refresh the JWKS cache, in seconds.
    pub jwks_refresh_seconds: u64,
    /// Timeout for each JWKS request, in seconds.
    pub request_timeout_seconds: u64,
}

impl AuthConfig {
    /// Get the expected token issuer.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Get the JWKS request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            jwks_url: FIREBASE_JWKS_URL.to_string(),
            jwks_refresh_seconds: 3600,
            request_timeout_seconds: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.jwks_url, FIREBASE_JWKS_URL);
        assert_eq!(config.jwks_refresh_seconds, 3600);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn issuer_uses_project_id() {
        let config = AuthConfig {
            project_id: "fish-app".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(config.issuer(), "https://securetoken.google.com/fish-app");
    }

    #[test]
    fn auth_error_status_codes() {
        assert_eq!(AuthError::IdentityRejected.http_status_code(), 401);
        assert_eq!(AuthError::KeyNotFound("k".into()).http_status_code(), 401);
        assert_eq!(
            AuthError::JwksFetchFailed("test".into()).http_status_code(),
            500
        );
        assert_eq!(AuthError::InvalidSecret("short".into()).http_status_code(), 500);
    }

    #[test]
    fn token_error_messages() {
        assert_eq!(TokenError::Expired.to_string(), "Token expired");
        assert_eq!(TokenError::Malformed.to_string(), "Invalid token");
    }
}
