//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! Firebase ID tokens are signed with rotating RSA keys that Google publishes
//! as a JWK set. This module fetches that set and caches the decoding keys
//! by key ID.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use parking_lot::RwLock;
use serde::Deserialize;

use crate::error::{AuthError, Result};
use crate::AuthConfig;

/// JWKS response from the identity provider.
#[derive(Debug, Deserialize)]
pub struct JwksResponse {
    /// The list of keys.
    pub keys: Vec<JwkKey>,
}

/// A single JWK (JSON Web Key).
#[derive(Debug, Deserialize)]
pub struct JwkKey {
    /// Key type (e.g., "RSA").
    pub kty: String,
    /// RSA modulus (base64url encoded).
    pub n: Option<String>,
    /// RSA public exponent (base64url encoded).
    pub e: Option<String>,
    /// Key ID.
    pub kid: Option<String>,
    /// Key use (e.g., "sig").
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    /// Algorithm (e.g., `RS256`).
    pub alg: Option<String>,
}

/// Minimum time between two fetches triggered by an unknown key ID.
///
/// Key IDs come from unauthenticated token headers.
pub const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

/// Cached JWKS keys with expiration.
struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
    /// Start of the most recent fetch, successful or not.
    last_attempt: Option<Instant>,
}

impl Default for CachedKeys {
    fn default() -> Self {
        Self {
            keys: HashMap::new(),
            // Far past so the first lookup triggers a fetch
            fetched_at: Instant::now()
                .checked_sub(Duration::from_secs(24 * 3600))
                .unwrap_or_else(Instant::now),
            last_attempt: None,
        }
    }
}

impl CachedKeys {
    fn is_fresh(&self, refresh_interval: Duration) -> bool {
        self.fetched_at.elapsed() < refresh_interval
    }

    fn attempted_recently(&self) -> bool {
        self.last_attempt
            .is_some_and(|at| at.elapsed() < MIN_REFETCH_INTERVAL)
    }
}

/// JWKS key provider that fetches and caches keys.
pub struct JwksProvider {
    config: AuthConfig,
    client: reqwest::Client,
    cache: RwLock<CachedKeys>,
    /// Serializes fetches so concurrent misses share one request.
    refresh_gate: tokio::sync::Mutex<()>,
}

impl JwksProvider {
    /// Create a new JWKS provider with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should never happen with default TLS).
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("failed to create HTTP client");

        Self {
            config,
            client,
            cache: RwLock::new(CachedKeys::default()),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Get a decoding key by key ID, fetching the JWK set if necessary.
    ///
    /// A miss refetches the set at most once per [`MIN_REFETCH_INTERVAL`];
    /// inside that window the cached set answers, even when stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not found or the JWKS fetch fails.
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey> {
        let refresh_interval = Duration::from_secs(self.config.jwks_refresh_seconds);
        if let Some(key) = self.lookup(kid, refresh_interval)? {
            return Ok(key);
        }

        let _gate = self.refresh_gate.lock().await;

        // Another task may have fetched while we waited
        if let Some(key) = self.lookup(kid, refresh_interval)? {
            return Ok(key);
        }

        self.refresh_keys().await?;

        let cache = self.cache.read();
        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    /// Answer from the cache when no fetch is due.
    ///
    /// `Ok(None)` means the caller should fetch.
    fn lookup(&self, kid: &str, refresh_interval: Duration) -> Result<Option<DecodingKey>> {
        let cache = self.cache.read();
        let key = cache.keys.get(kid);
        if cache.is_fresh(refresh_interval) {
            if let Some(key) = key {
                return Ok(Some(key.clone()));
            }
        }
        if cache.attempted_recently() {
            return key
                .cloned()
                .map(Some)
                .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()));
        }
        Ok(None)
    }

    /// Number of keys currently cached.
    #[must_use]
    pub fn cached_key_count(&self) -> usize {
        self.cache.read().keys.len()
    }

    /// Refresh the JWKS cache by fetching from the provider.
    async fn refresh_keys(&self) -> Result<()> {
        let jwks_url = &self.config.jwks_url;
        tracing::debug!(url = %jwks_url, "Fetching JWKS");
        self.cache.write().last_attempt = Some(Instant::now());

        let response = self
            .client
            .get(jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::JwksFetchFailed(format!(
                "JWKS endpoint returned status {status}"
            )));
        }

        let response: JwksResponse = response
            .json()
            .await
            .map_err(|e| AuthError::JwksFetchFailed(e.to_string()))?;

        let mut new_keys = HashMap::new();

        for key in response.keys {
            if let Some(kid) = &key.kid {
                if let Some(decoding_key) = Self::parse_key(&key)? {
                    new_keys.insert(kid.clone(), decoding_key);
                }
            }
        }

        tracing::debug!(count = new_keys.len(), "Cached JWKS keys");

        let mut cache = self.cache.write();
        cache.keys = new_keys;
        cache.fetched_at = Instant::now();

        Ok(())
    }

    /// Parse a JWK into a `DecodingKey`.
    fn parse_key(key: &JwkKey) -> Result<Option<DecodingKey>> {
        match key.kty.as_str() {
            "RSA" => {
                if let Some(alg) = key.alg.as_deref() {
                    if alg != "RS256" {
                        tracing::warn!(alg = alg, "Unsupported RSA algorithm");
                        return Ok(None);
                    }
                }

                let n = key
                    .n
                    .as_deref()
                    .ok_or_else(|| AuthError::JwksFetchFailed("missing n parameter".to_string()))?;
                let e = key
                    .e
                    .as_deref()
                    .ok_or_else(|| AuthError::JwksFetchFailed("missing e parameter".to_string()))?;

                let decoding_key = DecodingKey::from_rsa_components(n, e)
                    .map_err(|err| AuthError::JwksFetchFailed(format!("invalid RSA key: {err}")))?;

                Ok(Some(decoding_key))
            }
            other => {
                tracing::warn!(kty = other, "Unknown key type");
                Ok(None)
            }
        }
    }

    /// Force a refresh of the JWKS cache, ignoring the refetch interval.
    ///
    /// # Errors
    ///
    /// Returns an error if the JWKS fetch fails.
    pub async fn force_refresh(&self) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_keys().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_N: &str = include_str!("../testdata/firebase_test_key.n");

    fn rsa_key(kid: &str) -> JwkKey {
        JwkKey {
            kty: "RSA".to_string(),
            n: Some(TEST_N.trim().to_string()),
            e: Some("AQAB".to_string()),
            kid: Some(kid.to_string()),
            key_use: Some("sig".to_string()),
            alg: Some("RS256".to_string()),
        }
    }

    #[test]
    fn parse_rsa_key() {
        let result = JwksProvider::parse_key(&rsa_key("test-key")).unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn skip_unsupported_algorithm() {
        let mut key = rsa_key("test-key");
        key.alg = Some("RS512".to_string());
        assert!(JwksProvider::parse_key(&key).unwrap().is_none());
    }

    #[test]
    fn skip_unknown_key_type() {
        let key = JwkKey {
            kty: "OKP".to_string(),
            n: None,
            e: None,
            kid: Some("ed".to_string()),
            key_use: None,
            alg: None,
        };
        assert!(JwksProvider::parse_key(&key).unwrap().is_none());
    }

    #[test]
    fn rsa_key_without_modulus_is_error() {
        let mut key = rsa_key("test-key");
        key.n = None;
        assert!(JwksProvider::parse_key(&key).is_err());
    }

    #[tokio::test]
    async fn fetches_and_caches_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "keys": [{
                    "kty": "RSA",
                    "alg": "RS256",
                    "use": "sig",
                    "kid": "k1",
                    "n": TEST_N.trim(),
                    "e": "AQAB"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = JwksProvider::new(AuthConfig {
            jwks_url: format!("{}/jwks", server.uri()),
            ..AuthConfig::default()
        });

        assert!(provider.get_key("k1").await.is_ok());
        // Second lookup is served from the cache
        assert!(provider.get_key("k1").await.is_ok());
        assert_eq!(provider.cached_key_count(), 1);
    }

    #[tokio::test]
    async fn unknown_kid_is_key_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "keys": [] })),
            )
            .mount(&server)
            .await;

        let provider = JwksProvider::new(AuthConfig {
            jwks_url: format!("{}/jwks", server.uri()),
            ..AuthConfig::default()
        });

        let result = provider.get_key("missing").await;
        assert!(matches!(result, Err(AuthError::KeyNotFound(kid)) if kid == "missing"));
    }

    async fn single_key_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "keys": [{
                    "kty": "RSA",
                    "alg": "RS256",
                    "kid": "k1",
                    "n": TEST_N.trim(),
                    "e": "AQAB"
                }]
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn unknown_kids_do_not_refetch_within_interval() {
        let server = single_key_server().await;
        let provider = JwksProvider::new(AuthConfig {
            jwks_url: format!("{}/jwks", server.uri()),
            ..AuthConfig::default()
        });

        for i in 0..20 {
            let result = provider.get_key(&format!("bogus-{i}")).await;
            assert!(matches!(result, Err(AuthError::KeyNotFound(_))));
        }
        assert!(provider.get_key("k1").await.is_ok());

        let fetches = server.received_requests().await.unwrap();
        assert_eq!(fetches.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let server = single_key_server().await;
        let provider = std::sync::Arc::new(JwksProvider::new(AuthConfig {
            jwks_url: format!("{}/jwks", server.uri()),
            ..AuthConfig::default()
        }));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let provider = provider.clone();
                tokio::spawn(async move {
                    let kid = if i % 2 == 0 {
                        "k1".to_string()
                    } else {
                        format!("bogus-{i}")
                    };
                    provider.get_key(&kid).await.is_ok()
                })
            })
            .collect();

        let mut found = 0;
        for task in tasks {
            if task.await.unwrap() {
                found += 1;
            }
        }

        assert_eq!(found, 8);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_also_throttles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = JwksProvider::new(AuthConfig {
            jwks_url: format!("{}/jwks", server.uri()),
            ..AuthConfig::default()
        });

        let first = provider.get_key("k1").await;
        assert!(matches!(first, Err(AuthError::JwksFetchFailed(_))));
        let second = provider.get_key("k1").await;
        assert!(matches!(second, Err(AuthError::KeyNotFound(_))));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn force_refresh_ignores_interval() {
        let server = single_key_server().await;
        let provider = JwksProvider::new(AuthConfig {
            jwks_url: format!("{}/jwks", server.uri()),
            ..AuthConfig::default()
        });

        assert!(provider.get_key("missing").await.is_err());
        provider.force_refresh().await.unwrap();
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn server_error_is_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = JwksProvider::new(AuthConfig {
            jwks_url: format!("{}/jwks", server.uri()),
            ..AuthConfig::default()
        });

        let result = provider.force_refresh().await;
        assert!(matches!(result, Err(AuthError::JwksFetchFailed(_))));
    }
}
