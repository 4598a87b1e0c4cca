//! Upstream error types.
//!
//! The `Display` text of each variant is what clients see, so it is kept
//! short and free of transport internals for the fish flow.

use thiserror::Error;

/// A result type using `UpstreamError`.
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Errors that can occur while calling third-party services.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The Fishial client-credential exchange failed.
    #[error("Failed to get access token")]
    AccessToken,

    /// Fishial refused to hand out a direct upload URL.
    #[error("Failed to get upload URL")]
    UploadUrl,

    /// The image could not be uploaded to the signed URL.
    #[error("Failed to upload image")]
    Upload,

    /// The recognition query failed.
    #[error("Failed to recognize fish")]
    Recognition,

    /// The geocoder returned no match.
    #[error("No results found for location: {0}")]
    LocationNotFound(String),

    /// The geocoding request failed.
    #[error("Geocoding error: {0}")]
    Geocoding(String),

    /// The forecast request failed or returned an unusable payload.
    #[error("Weather API error: {0}")]
    Forecast(String),

    /// A third-party service answered with a payload we cannot interpret.
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// Returns `true` if the failure stems from the caller's input rather
    /// than from the upstream service.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::LocationNotFound(_) | Self::Geocoding(_))
    }
}
