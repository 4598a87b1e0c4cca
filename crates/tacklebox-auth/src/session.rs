//! Session token issuance and verification.
//!
//! After a successful login the backend mints its own HS256 JWT carrying the
//! subject, the issue time and an expiry 90 days later. Tokens are never
//! stored, renewed or revoked; verification only checks the signature and
//! the expiry, with no leeway.

use std::fmt;

use base64::prelude::*;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use tacklebox_core::SubjectId;

use crate::error::{AuthError, Result, TokenError};
use crate::identity::VerifiedIdentity;

/// Lifetime of a session token.
pub const SESSION_TTL_DAYS: i64 = 90;

/// Minimum length of a configured session secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Symmetric key used to sign session tokens.
///
/// A freshly generated secret lives only in process memory, so restarting the
/// process invalidates every token it issued. Supplying the secret from
/// configuration keeps tokens valid across restarts and instances.
#[derive(Clone)]
pub struct SessionSecret(Vec<u8>);

impl SessionSecret {
    /// Generate a random 32-byte secret from the OS RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS random source is unavailable.
    pub fn generate() -> Result<Self> {
        let mut bytes = vec![0u8; MIN_SECRET_LEN];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| AuthError::Internal(format!("random source unavailable: {e}")))?;
        Ok(Self(bytes))
    }

    /// Decode a base64 (URL-safe or standard, padding optional) secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not base64 or decodes to fewer than
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .or_else(|_| BASE64_STANDARD.decode(encoded))
            .map_err(|e| AuthError::InvalidSecret(format!("not valid base64: {e}")))?;

        if bytes.len() < MIN_SECRET_LEN {
            return Err(AuthError::InvalidSecret(format!(
                "expected at least {MIN_SECRET_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self(bytes))
    }

    /// Return the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionSecret([REDACTED; {}])", self.0.len())
    }
}

/// A freshly minted session token.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// The compact signed JWT handed to the client.
    pub token: String,
    /// The subject the token was issued to.
    pub subject_id: SubjectId,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    uid: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens with a single symmetric secret.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    /// Create session keys from a secret.
    #[must_use]
    pub fn new(secret: &SessionSecret) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(SESSION_TTL_DAYS),
        }
    }

    /// Issue a token for `subject_id`, valid for 90 days from now.
    ///
    /// # Errors
    ///
    /// Returns an error only if the claims cannot be serialized or signed.
    pub fn issue(&self, subject_id: &SubjectId) -> Result<SessionToken> {
        self.issue_at(subject_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the claims cannot be serialized or signed.
    pub fn issue_at(&self, subject_id: &SubjectId, now: DateTime<Utc>) -> Result<SessionToken> {
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let expires_at = issued_at + self.ttl;

        let claims = SessionClaims {
            uid: subject_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign session token: {e}")))?;

        Ok(SessionToken {
            token,
            subject_id: subject_id.clone(),
            issued_at,
            expires_at,
        })
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] if the token cannot be decoded or the
    /// signature does not match, and [`TokenError::Expired`] if it is past its
    /// expiry.
    pub fn verify(&self, token: &str) -> std::result::Result<VerifiedIdentity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// See [`SessionKeys::verify`].
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<VerifiedIdentity, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared below against the supplied clock
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Session token rejected");
                TokenError::Malformed
            })?
            .claims;

        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        let subject_id = SubjectId::new(claims.uid).map_err(|_| TokenError::Malformed)?;
        Ok(VerifiedIdentity { subject_id })
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_days", &self.ttl.num_days())
            .finish_non_exhaustive()
    }
}
