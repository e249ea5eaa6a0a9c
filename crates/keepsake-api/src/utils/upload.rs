//! Multipart parsing for photo uploads.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use keepsake_core::AppError;
use keepsake_processing::{UploadRequest, UploadedFile};
use uuid::Uuid;

/// File field names accepted for the upload.
const FILE_FIELDS: &[&str] = &["photo", "file"];
/// Uploader field names; `name` is what older clients send.
const UPLOADER_FIELDS: &[&str] = &["uploaderName", "name"];

/// Read the whole multipart body into an [`UploadRequest`].
///
/// Field presence is not checked here; the ingestion pipeline reports missing
/// fields so every entry point answers the same way. Only one file field is
/// accepted.
pub async fn extract_upload_request(
    album_id: Uuid,
    mut multipart: Multipart,
) -> Result<UploadRequest, AppError> {
    let mut request = UploadRequest {
        album_id,
        title: None,
        uploader_name: None,
        file: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if FILE_FIELDS.contains(&field_name.as_str()) {
            if request.file.is_some() {
                return Err(AppError::Validation(
                    "Multiple file fields are not allowed; send exactly one field named 'photo'"
                        .to_string(),
                ));
            }
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error("Failed to read file data", e))?;

            request.file = Some(UploadedFile {
                filename,
                content_type,
                data,
            });
        } else if field_name == "title" {
            request.title = Some(read_text(field).await?);
        } else if UPLOADER_FIELDS.contains(&field_name.as_str()) {
            request.uploader_name = Some(read_text(field).await?);
        } else {
            tracing::debug!(field = %field_name, "Ignoring unknown multipart field");
        }
    }

    Ok(request)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| multipart_error("Failed to read form field", e))
}

/// A body cut off by the route's size limit is a 413, anything else is a bad form.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: request body exceeds the upload limit", context))
    } else {
        AppError::Validation(format!("{}: {}", context, e))
    }
}
