//! `/uploads/{filename}`: serves media through the resolution service.

use crate::error::{FileNotFoundResponse, HttpAppError};
use crate::services::resolution::{ResolveError, Resolved};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use keepsake_core::AppError;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

const CACHE_CONTROL: &str = "public, max-age=86400";

#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    tag = "uploads",
    params(("filename" = String, Path, description = "Stored filename")),
    responses(
        (status = 200, description = "Media bytes"),
        (status = 302, description = "Media lives on the remote host"),
        (status = 404, description = "Unknown file", body = FileNotFoundResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "serve_upload"))]
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    let resolved = match state.resolver.resolve(&filename).await {
        Ok(resolved) => resolved,
        Err(ResolveError::NotFound) => return Ok(not_found(filename)),
    };

    match resolved {
        Resolved::Redirect(url) => {
            Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
        }
        Resolved::Bytes { data, mime_type } => Ok((
            [
                (header::CONTENT_TYPE, mime_type),
                (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
            ],
            data,
        )
            .into_response()),
        Resolved::File { path, mime_type } => {
            let file = match tokio::fs::File::open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(not_found(filename));
                }
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Failed to open stored file");
                    return Err(AppError::Internal(e.to_string()).into());
                }
            };
            let mut builder = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime_type.as_str())
                .header(header::CACHE_CONTROL, CACHE_CONTROL);
            if let Ok(metadata) = file.metadata().await {
                builder = builder.header(header::CONTENT_LENGTH, metadata.len());
            }

            builder
                .body(Body::from_stream(ReaderStream::new(file)))
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to build response");
                    HttpAppError::from(AppError::Internal(e.to_string()))
                })
        }
    }
}

fn not_found(filename: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(FileNotFoundResponse {
            message: "File not found".to_string(),
            filename,
        }),
    )
        .into_response()
}
