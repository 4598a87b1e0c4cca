//! Fish identification endpoint.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;

use tacklebox_auth::IdentityVerifier;
use tacklebox_upstream::{FishRecognizer, ForecastProvider, Geocoder, Identification, ImageUpload};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::GatewayState;

const FILE_FIELD: &str = "file";

/// Identify the fish in an uploaded photo.
///
/// Expects a multipart form with the image in the `file` field. The image is
/// kept in memory for the duration of the request.
///
/// # Errors
///
/// Returns 400 if the form has no file or nothing was recognized, and 500
/// with the failing step's message if Fishial fails.
pub async fn identify<V, F, W>(
    State(state): State<Arc<GatewayState<V, F, W>>>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Identification>, ApiError>
where
    V: IdentityVerifier + 'static,
    F: FishRecognizer + 'static,
    W: Geocoder + ForecastProvider + 'static,
{
    // A request that is not multipart at all has no file part either
    let mut multipart = multipart.map_err(|_| no_file_part())?;
    let image = read_image(&mut multipart).await?;

    tracing::info!(
        subject = %user.subject_id,
        filename = %image.filename,
        byte_size = image.byte_size(),
        "Fish identification requested"
    );

    let identification = state.fish.identify(&image).await.map_err(|e| {
        tracing::error!(error = %e, "Fish identification failed");
        ApiError::from(e)
    })?;

    identification
        .map(Json)
        .ok_or_else(|| ApiError::BadRequest("Unable to identify fish".to_string()))
}

async fn read_image(multipart: &mut Multipart) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // Without a filename parameter the part is a plain form value
        let filename = match field.file_name() {
            None => continue,
            Some("") => return Err(ApiError::BadRequest("No selected file".to_string())),
            Some(name) => name.to_string(),
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?;

        return Ok(ImageUpload {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(no_file_part())
}

fn no_file_part() -> ApiError {
    ApiError::BadRequest("No file part".to_string())
}
