//! Federated identity verification.
//!
//! Clients log in with a Firebase ID token. The token is an RS256 JWT whose
//! signing key is published in Google's JWK set; this module checks the
//! signature, issuer, audience and expiry and yields the Firebase uid.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;

use tacklebox_core::SubjectId;

use crate::error::{AuthError, Result};
use crate::jwks::JwksProvider;
use crate::AuthConfig;

/// The trusted outcome of verifying a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// The verified subject.
    pub subject_id: SubjectId,
}

/// Trait for verifying identity assertions issued by the federated provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify an identity assertion and return the subject it proves.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::IdentityRejected`] for every kind of failure. The
    /// reason is logged but never returned.
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity>;
}

/// Claims of a Firebase ID token that are not checked by `jsonwebtoken` itself.
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    /// Firebase uid.
    sub: String,
    /// Issue time, in seconds since the epoch.
    iat: i64,
    /// When the user authenticated, in seconds since the epoch.
    #[serde(default)]
    auth_time: Option<i64>,
}

/// Verifies Firebase ID tokens against Google's published keys.
pub struct FirebaseVerifier {
    config: AuthConfig,
    jwks: JwksProvider,
}

impl FirebaseVerifier {
    /// Create a new Firebase verifier.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let jwks = JwksProvider::new(config.clone());
        Self { config, jwks }
    }

    /// Get a reference to the JWKS provider for manual operations.
    #[must_use]
    pub const fn jwks(&self) -> &JwksProvider {
        &self.jwks
    }

    async fn check(&self, assertion: &str) -> Result<VerifiedIdentity> {
        let header =
            decode_header(assertion).map_err(|e| AuthError::InvalidAssertion(e.to_string()))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidAssertion("missing kid header".to_string()))?;

        let key = self.jwks.get_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        // No clock skew allowance, matching the provider's own verifier
        validation.leeway = 0;
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[&self.config.project_id]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);

        let token_data = decode::<FirebaseClaims>(assertion, &key, &validation)
            .map_err(|e| AuthError::InvalidAssertion(e.to_string()))?;
        let claims = token_data.claims;

        let now = Utc::now().timestamp();
        if claims.iat > now {
            return Err(AuthError::InvalidAssertion("iat is in the future".to_string()));
        }
        if claims.auth_time.is_some_and(|auth_time| auth_time > now) {
            return Err(AuthError::InvalidAssertion(
                "auth_time is in the future".to_string(),
            ));
        }

        let subject_id = SubjectId::new(claims.sub)?;
        Ok(VerifiedIdentity { subject_id })
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity> {
        match self.check(assertion).await {
            Ok(identity) => {
                tracing::debug!(subject = %identity.subject_id, "Identity assertion verified");
                Ok(identity)
            }
            Err(reason) => {
                tracing::warn!(reason = %reason, "Identity assertion rejected");
                Err(AuthError::IdentityRejected)
            }
        }
    }
}

/// A mock identity verifier for testing.
///
/// Accepts any assertion in the format `test-assertion:<uid>`.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockIdentityVerifier;

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity> {
        let uid = assertion
            .strip_prefix("test-assertion:")
            .ok_or(AuthError::IdentityRejected)?;
        let subject_id = SubjectId::new(uid).map_err(|_| AuthError::IdentityRejected)?;
        Ok(VerifiedIdentity { subject_id })
    }
}
