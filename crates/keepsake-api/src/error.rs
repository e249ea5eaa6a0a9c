//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into [`AppError`] converts into `HttpAppError` and renders with the
//! same body shape, status and log line.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use keepsake_core::{AppError, ErrorMetadata, LogLevel};
use keepsake_processing::ValidationError;
use keepsake_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Body of a 404 from the uploads route.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileNotFoundResponse {
    pub message: String,
    pub filename: String,
}

/// Wrapper so `IntoResponse` can be implemented for the core error type.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Malformed JSON bodies are client errors.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::MediaNotFound(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::BackendError(msg) => AppError::StorageUnavailable(msg),
            StorageError::InvalidKey(msg) => AppError::Validation(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

/// JSON body extractor that answers malformed bodies with the `ErrorResponse` shape.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.eq_ignore_ascii_case("production") || env.eq_ignore_ascii_case("prod"))
        .unwrap_or(false)
}

impl HttpAppError {
    fn body(&self, is_production: bool) -> ErrorResponse {
        let app_error = &self.0;
        let show_details = !is_production && !app_error.is_sensitive();
        ErrorResponse {
            error: app_error.client_message(),
            details: show_details.then(|| app_error.detailed_message()),
            error_type: show_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        (status, Json(self.body(is_production_env()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_becomes_media_not_found() {
        let HttpAppError(app_err) = StorageError::NotFound("gone.jpg".to_string()).into();
        assert!(matches!(app_err, AppError::MediaNotFound(msg) if msg == "gone.jpg"));
    }

    #[test]
    fn storage_backend_failures_are_unavailable() {
        for err in [
            StorageError::UploadFailed("u".to_string()),
            StorageError::DeleteFailed("d".to_string()),
            StorageError::BackendError("b".to_string()),
        ] {
            let HttpAppError(app_err) = err.into();
            assert_eq!(app_err.http_status_code(), 503);
        }
    }

    #[test]
    fn storage_io_error_is_internal() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let HttpAppError(app_err) = StorageError::IoError(io_err).into();
        match app_err {
            AppError::Internal(msg) => assert!(msg.contains("denied")),
            other => panic!("expected Internal, got {:?}", other),
        }
    }

    #[test]
    fn validation_errors_keep_their_status() {
        let HttpAppError(too_large) = ValidationError::FileTooLarge { size: 10, max: 5 }.into();
        assert_eq!(too_large.http_status_code(), 413);

        let HttpAppError(bad_ext) = ValidationError::InvalidExtension {
            extension: "exe".to_string(),
            allowed: vec!["jpg".to_string()],
        }
        .into();
        assert_eq!(bad_ext.http_status_code(), 415);
    }

    #[test]
    fn sensitive_errors_hide_details() {
        let err = HttpAppError(AppError::StorageUnavailable("bucket down".to_string()));
        let body = err.body(false);
        assert!(body.details.is_none());
        assert_eq!(body.code, "STORAGE_UNAVAILABLE");
        assert!(!body.error.contains("bucket"));
    }

    #[test]
    fn production_hides_all_details() {
        let err = HttpAppError(AppError::AlbumNotFound("abc".to_string()));
        assert!(err.body(false).details.is_some());
        assert!(err.body(true).details.is_none());
        assert!(err.body(true).error_type.is_none());
    }
}
