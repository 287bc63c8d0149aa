//! Upload handler.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use utoipa::ToSchema;

use crate::api::dto::Envelope;
use crate::api::extract::AuthUser;
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};
use crate::service::StoredMedia;

/// Multipart form accepted by `POST /media/upload`.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The file to store.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::InvalidRequest(err.body_text())
    }
}

/// `POST /media/upload`: Store an image and return its public URL.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] without a `file` part,
/// [`ApiError::PayloadTooLarge`] above the configured limit, and
/// [`ApiError::StorageError`] when the file cannot be written.
#[utoipa::path(
    post,
    path = "/media/upload",
    tag = "Media",
    summary = "Upload file",
    description = "Stores the `file` part under the upload directory; the returned URL is served from `/public`.",
    security(("bearer" = [])),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = Envelope<StoredMedia>),
        (status = 400, description = "Missing or empty file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let stored = state.media.store(file_name.as_deref(), &bytes).await?;
        tracing::info!(user_id = %user.id, url = %stored.url, size = bytes.len(), "media stored");
        return Ok((StatusCode::CREATED, Json(Envelope::new(stored))));
    }

    Err(ApiError::InvalidRequest(
        "multipart field `file` is required".to_string(),
    ))
}

/// Upload routes, without the body limit layer.
pub fn routes() -> Router<AppState> {
    Router::new().route("/media/upload", post(upload))
}
