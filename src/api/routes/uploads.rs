//! Upload Routes
//!
//! - POST /api/v1/uploads/photo - Raw image body, proxied to the image host

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::UploadParams;
use crate::api::error::ApiResult;
use crate::api::extract::AuthUser;
use crate::api::state::AppState;
use crate::uploads::{check_image, sanitize_name, UploadError, UploadedImage};

/// POST /api/v1/uploads/photo?name=<file name>
///
/// Any approved account may upload.
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> ApiResult<Json<UploadedImage>> {
    auth.require(None)?;

    let host = state.image_host.as_ref().ok_or(UploadError::Disabled)?;
    check_image(&body, state.config.uploads.max_bytes)?;

    let name = sanitize_name(params.name.as_deref().unwrap_or(""));
    let image = host.upload(&name, &body).await?;

    tracing::info!(
        user_id = %auth.user.id,
        host = host.name(),
        bytes = body.len(),
        url = %image.url,
        "Uploaded photo"
    );
    Ok(Json(image))
}
