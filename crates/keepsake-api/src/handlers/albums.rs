//! Album CRUD handlers.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use keepsake_core::models::{Album, CreateAlbumRequest, UpdateAlbumRequest};
use keepsake_core::AppError;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/albums",
    tag = "albums",
    request_body = CreateAlbumRequest,
    responses(
        (status = 201, description = "Album created", body = Album),
        (status = 400, description = "Invalid album", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "create_album"))]
pub async fn create_album(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateAlbumRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let album = state.albums.create(Album::new(request)).await?;
    tracing::info!(album_id = %album.id, "Album created");

    Ok((StatusCode::CREATED, Json(album)))
}

#[utoipa::path(
    get,
    path = "/api/albums",
    tag = "albums",
    responses(
        (status = 200, description = "All albums, newest first", body = Vec<Album>)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_albums"))]
pub async fn list_albums(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Album>>, HttpAppError> {
    Ok(Json(state.albums.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/albums/{id}",
    tag = "albums",
    params(("id" = Uuid, Path, description = "Album ID")),
    responses(
        (status = 200, description = "Album", body = Album),
        (status = 404, description = "Album not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_album"))]
pub async fn get_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Album>, HttpAppError> {
    let album = state
        .albums
        .get(id)
        .await?
        .ok_or_else(|| AppError::AlbumNotFound(id.to_string()))?;
    Ok(Json(album))
}

#[utoipa::path(
    put,
    path = "/api/albums/{id}",
    tag = "albums",
    params(("id" = Uuid, Path, description = "Album ID")),
    request_body = UpdateAlbumRequest,
    responses(
        (status = 200, description = "Updated album", body = Album),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Album not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, update), fields(operation = "update_album"))]
pub async fn update_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(update): ValidatedJson<UpdateAlbumRequest>,
) -> Result<Json<Album>, HttpAppError> {
    update.validate().map_err(AppError::from)?;

    let album = state
        .albums
        .update(id, update)
        .await?
        .ok_or_else(|| AppError::AlbumNotFound(id.to_string()))?;
    Ok(Json(album))
}

#[utoipa::path(
    delete,
    path = "/api/albums/{id}",
    tag = "albums",
    params(("id" = Uuid, Path, description = "Album ID")),
    responses(
        (status = 204, description = "Album and its media deleted"),
        (status = 404, description = "Album not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_album"))]
pub async fn delete_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.lifecycle.delete_album(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
