//! Fish recognition through the Fishial API.
//!
//! Identification takes four round trips, each of which aborts the flow on
//! failure:
//!
//! 1. exchange client credentials for an access token
//! 2. request a direct-upload slot addressed by the image's MD5 checksum
//! 3. `PUT` the image bytes to the signed URL
//! 4. query recognition results by the slot's signed id

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::*;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, UpstreamError};
use crate::fish_details::{extract_fish_details, FishDetails};
use crate::{build_http_client, FishialConfig};

/// An image received from a client, held in memory.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original file name.
    pub filename: String,
    /// MIME type reported by the client.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Base64-encoded MD5 digest of the image, as Fishial expects it.
    #[must_use]
    pub fn checksum(&self) -> String {
        BASE64_STANDARD.encode(Md5::digest(&self.bytes))
    }

    /// Size of the image in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

/// The best match for an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identification {
    /// Detection score of the best result.
    #[serde(rename = "Confidence")]
    pub confidence: f64,
    /// Reshaped species details.
    #[serde(rename = "Details")]
    pub details: FishDetails,
}

/// Trait for fish recognition services.
#[async_trait]
pub trait FishRecognizer: Send + Sync {
    /// Identify the fish in an image.
    ///
    /// Returns `Ok(None)` when the service answered but found nothing.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first upstream step that failed.
    async fn identify(&self, image: &ImageUpload) -> Result<Option<Identification>>;
}

/// Request body for the client-credential exchange.
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    blob: BlobDescriptor<'a>,
}

#[derive(Debug, Serialize)]
struct BlobDescriptor<'a> {
    filename: &'a str,
    content_type: &'a str,
    byte_size: usize,
    checksum: String,
}

#[derive(Debug, Deserialize)]
struct UploadSlot {
    #[serde(rename = "direct-upload")]
    direct_upload: DirectUpload,
    #[serde(rename = "signed-id")]
    signed_id: String,
}

#[derive(Debug, Deserialize)]
struct DirectUpload {
    url: String,
    #[serde(default)]
    headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(default)]
    results: Option<Vec<RecognitionResult>>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(rename = "detection-score")]
    detection_score: f64,
    #[serde(default)]
    species: Vec<Value>,
}

/// HTTP client for the Fishial recognition API.
#[derive(Debug, Clone)]
pub struct FishialClient {
    client: reqwest::Client,
    config: FishialConfig,
}

impl FishialClient {
    /// Create a new Fishial client with a per-request timeout.
    #[must_use]
    pub fn new(config: FishialConfig, timeout: Duration) -> Self {
        Self {
            client: build_http_client(timeout),
            config,
        }
    }

    /// Create a new Fishial client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: FishialConfig) -> Self {
        Self { client, config }
    }

    async fn access_token(&self) -> Result<String> {
        let url = format!("{}/v1/auth/token", self.config.auth_url);
        let request = TokenRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| step_failed("token exchange", &e, UpstreamError::AccessToken))?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "Fishial token exchange rejected");
            return Err(UpstreamError::AccessToken);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| step_failed("token exchange", &e, UpstreamError::AccessToken))?;
        Ok(token.access_token)
    }

    async fn upload_slot(&self, access_token: &str, image: &ImageUpload) -> Result<UploadSlot> {
        let url = format!("{}/v1/recognition/upload", self.config.api_url);
        let request = UploadRequest {
            blob: BlobDescriptor {
                filename: &image.filename,
                content_type: &image.content_type,
                byte_size: image.byte_size(),
                checksum: image.checksum(),
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| step_failed("upload slot", &e, UpstreamError::UploadUrl))?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "Fishial upload slot rejected");
            return Err(UpstreamError::UploadUrl);
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("upload slot: {e}")))
    }

    async fn upload(&self, slot: &DirectUpload, image: &ImageUpload) -> Result<()> {
        let mut request = self.client.put(&slot.url).body(image.bytes.clone());
        for (name, value) in &slot.headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| step_failed("image upload", &e, UpstreamError::Upload))?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "Signed upload rejected");
            return Err(UpstreamError::Upload);
        }
        Ok(())
    }

    async fn recognize(&self, access_token: &str, signed_id: &str) -> Result<RecognitionResponse> {
        let url = format!("{}/v1/recognition/image", self.config.api_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("q", signed_id)])
            .send()
            .await
            .map_err(|e| step_failed("recognition", &e, UpstreamError::Recognition))?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "Fishial recognition rejected");
            return Err(UpstreamError::Recognition);
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("recognition: {e}")))
    }
}

#[async_trait]
impl FishRecognizer for FishialClient {
    async fn identify(&self, image: &ImageUpload) -> Result<Option<Identification>> {
        tracing::debug!(
            filename = %image.filename,
            content_type = %image.content_type,
            byte_size = image.byte_size(),
            "Identifying fish"
        );

        let access_token = self.access_token().await?;
        let slot = self.upload_slot(&access_token, image).await?;
        self.upload(&slot.direct_upload, image).await?;
        let recognition = self.recognize(&access_token, &slot.signed_id).await?;

        let Some(best) = recognition.results.and_then(|r| r.into_iter().next()) else {
            return Ok(None);
        };

        let species = best.species.first().ok_or_else(|| {
            UpstreamError::InvalidResponse("recognition result has no species".to_string())
        })?;

        Ok(Some(Identification {
            confidence: best.detection_score,
            details: extract_fish_details(species),
        }))
    }
}

fn step_failed(step: &str, err: &reqwest::Error, mapped: UpstreamError) -> UpstreamError {
    tracing::error!(step = step, error = %err, "Fishial request failed");
    mapped
}
