//! Upload pipeline: validate → check album → store → thumbnail → record.
//!
//! Validation and the album lookup happen before any byte is written. Thumbnail
//! failures never fail the upload. If the record cannot be written, the bytes
//! that were just stored are removed again on a best-effort basis.

use std::sync::Arc;

use keepsake_core::media_kind::{is_video_extension, mime_for_extension};
use keepsake_core::models::{MediaRecord, NewMediaRecord};
use keepsake_core::{AppError, StorageBackend};
use keepsake_db::{AlbumStore, MediaStore};
use keepsake_storage::{Storage, StoredObject};

use super::types::UploadRequest;
use crate::validator::{sanitize_filename, MediaValidator, ValidationError};
use crate::video::ThumbnailGenerator;

/// Ingestion pipeline bound to the active storage adapter.
///
/// Holds no per-request state; one `ingest` call per upload.
#[derive(Clone)]
pub struct MediaIngestionPipeline {
    albums: Arc<dyn AlbumStore>,
    media: Arc<dyn MediaStore>,
    storage: Arc<dyn Storage>,
    thumbnailer: Option<Arc<dyn ThumbnailGenerator>>,
    validator: MediaValidator,
}

struct ThumbnailOutcome {
    locator: String,
    inline_data: Option<Vec<u8>>,
    /// Only separately stored thumbnails need cleanup.
    stored: bool,
}

impl MediaIngestionPipeline {
    pub fn new(
        albums: Arc<dyn AlbumStore>,
        media: Arc<dyn MediaStore>,
        storage: Arc<dyn Storage>,
        thumbnailer: Option<Arc<dyn ThumbnailGenerator>>,
        validator: MediaValidator,
    ) -> Self {
        Self {
            albums,
            media,
            storage,
            thumbnailer,
            validator,
        }
    }

    #[tracing::instrument(skip(self, request), fields(album_id = %request.album_id))]
    pub async fn ingest(&self, request: UploadRequest) -> Result<MediaRecord, AppError> {
        let title = self
            .validator
            .require_field("title", request.title.as_deref())?;
        let uploader_name = self
            .validator
            .require_field("uploaderName", request.uploader_name.as_deref())?;
        let file = request.file.ok_or(ValidationError::MissingFile)?;
        let extension = self.validator.validate_extension(&file.filename)?;
        self.validator.validate_file_size(file.data.len())?;

        if self.albums.get(request.album_id).await?.is_none() {
            return Err(AppError::AlbumNotFound(request.album_id.to_string()));
        }

        let is_video = is_video_extension(&extension);
        let mime_type = effective_mime_type(&file.content_type, &extension);
        let file_size = file.data.len() as i64;

        let stored = self
            .storage
            .store(file.data.clone(), &file.filename, &mime_type)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, backend = %self.storage.backend_type(), "Storing upload failed");
                AppError::StorageUnavailable(e.to_string())
            })?;

        let thumbnail = if is_video {
            self.produce_thumbnail(&stored, &file.data, &extension).await
        } else {
            None
        };

        let new_record = NewMediaRecord {
            album_id: request.album_id,
            title,
            uploader_name,
            original_filename: sanitize_filename(&file.filename),
            is_video,
            primary_locator: stored.locator.clone(),
            thumbnail_locator: thumbnail.as_ref().map(|t| t.locator.clone()),
            mime_type: Some(mime_type),
            file_size,
            storage_backend: stored.backend,
            inline_data: stored.inline_data.as_ref().map(|b| b.to_vec()),
            thumbnail_data: thumbnail.as_ref().and_then(|t| t.inline_data.clone()),
        };

        match self.media.insert(new_record).await {
            Ok(record) => {
                tracing::info!(
                    media_id = %record.id,
                    backend = %record.storage_backend,
                    is_video = record.is_video,
                    has_thumbnail = record.thumbnail_locator.is_some(),
                    size_bytes = record.file_size,
                    "Media ingested"
                );
                Ok(record)
            }
            Err(e) => {
                tracing::error!(error = %e, locator = %stored.locator, "Media record write failed, removing stored bytes");
                self.remove_orphan(&stored.locator).await;
                if let Some(thumb) = thumbnail.filter(|t| t.stored) {
                    self.remove_orphan(&thumb.locator).await;
                }
                Err(e)
            }
        }
    }

    async fn produce_thumbnail(
        &self,
        stored: &StoredObject,
        data: &[u8],
        extension: &str,
    ) -> Option<ThumbnailOutcome> {
        if let Some(locator) = self.storage.derived_thumbnail(stored) {
            return Some(ThumbnailOutcome {
                locator,
                inline_data: None,
                stored: false,
            });
        }

        let thumbnailer = self.thumbnailer.as_ref()?;

        let jpeg = match thumbnailer.generate(data, extension).await {
            Ok(jpeg) => jpeg,
            Err(e) => {
                let err = AppError::from(e);
                tracing::warn!(error = %err, locator = %stored.locator, "Continuing without thumbnail");
                return None;
            }
        };

        match self.storage.store_thumbnail(stored, jpeg).await {
            Ok(thumb) => Some(ThumbnailOutcome {
                locator: thumb.locator,
                inline_data: thumb.inline_data.map(|b| b.to_vec()),
                stored: thumb.backend != StorageBackend::Inline,
            }),
            Err(e) => {
                tracing::warn!(error = %e, locator = %stored.locator, "Storing thumbnail failed, continuing without thumbnail");
                None
            }
        }
    }

    async fn remove_orphan(&self, locator: &str) {
        if let Err(e) = self.storage.delete(locator).await {
            tracing::warn!(error = %e, locator = %locator, "Failed to remove orphaned bytes");
        }
    }
}

/// Declared content type unless it is missing or generic.
fn effective_mime_type(declared: &str, extension: &str) -> String {
    let declared = declared.trim();
    if declared.is_empty() || declared.eq_ignore_ascii_case("application/octet-stream") {
        mime_for_extension(extension).to_string()
    } else {
        declared.to_lowercase()
    }
}
