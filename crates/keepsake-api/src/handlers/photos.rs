//! Photo and video handlers: upload, listing, lookup and deletion.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_upload_request;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use keepsake_core::models::MediaRecord;
use keepsake_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/albums/{id}/photos",
    tag = "photos",
    params(("id" = Uuid, Path, description = "Album ID")),
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Fields `title`, `uploaderName` (or `name`) and file field `photo` (or `file`)"
    ),
    responses(
        (status = 201, description = "Media uploaded", body = MediaRecord),
        (status = 400, description = "Missing field or file", body = ErrorResponse),
        (status = 404, description = "Album not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Extension not allowed", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_photo"))]
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Path(album_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let request = extract_upload_request(album_id, multipart).await?;
    let record = state.pipeline.ingest(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/albums/{id}/photos",
    tag = "photos",
    params(("id" = Uuid, Path, description = "Album ID")),
    responses(
        (status = 200, description = "Media in the album, newest first", body = Vec<MediaRecord>),
        (status = 404, description = "Album not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_album_photos"))]
pub async fn list_album_photos(
    State(state): State<Arc<AppState>>,
    Path(album_id): Path<Uuid>,
) -> Result<Json<Vec<MediaRecord>>, HttpAppError> {
    if state.albums.get(album_id).await?.is_none() {
        return Err(AppError::AlbumNotFound(album_id.to_string()).into());
    }
    Ok(Json(state.media.list_by_album(album_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/photos/{id}",
    tag = "photos",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media record", body = MediaRecord),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_photo"))]
pub async fn get_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaRecord>, HttpAppError> {
    let record = state
        .media
        .get(id)
        .await?
        .ok_or_else(|| AppError::MediaNotFound(id.to_string()))?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/photos/{id}",
    tag = "photos",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 204, description = "Media and its bytes deleted"),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_photo"))]
pub async fn delete_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.lifecycle.delete_media(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
