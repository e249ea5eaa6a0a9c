//! Media lifecycle operations: deleting records together with their bytes.
//!
//! Keeps handler logic thin and allows unit testing without HTTP.

use keepsake_core::models::MediaRecord;
use keepsake_core::AppError;
use keepsake_db::{AlbumStore, MediaStore};
use keepsake_storage::{DeleteOutcome, StorageSet};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct MediaLifecycleService {
    albums: Arc<dyn AlbumStore>,
    media: Arc<dyn MediaStore>,
    storage: StorageSet,
}

impl MediaLifecycleService {
    pub fn new(
        albums: Arc<dyn AlbumStore>,
        media: Arc<dyn MediaStore>,
        storage: StorageSet,
    ) -> Self {
        Self {
            albums,
            media,
            storage,
        }
    }

    /// Delete a media record and the bytes behind it.
    ///
    /// Byte removal is best-effort; the record is removed even when the
    /// backend no longer has the bytes.
    #[tracing::instrument(skip(self), fields(operation = "delete_media"))]
    pub async fn delete_media(&self, id: Uuid) -> Result<(), AppError> {
        let record = self
            .media
            .get(id)
            .await?
            .ok_or_else(|| AppError::MediaNotFound(id.to_string()))?;

        self.remove_record(&record).await
    }

    /// Delete an album, every media record in it, and their bytes.
    #[tracing::instrument(skip(self), fields(operation = "delete_album"))]
    pub async fn delete_album(&self, id: Uuid) -> Result<(), AppError> {
        if self.albums.get(id).await?.is_none() {
            return Err(AppError::AlbumNotFound(id.to_string()));
        }

        let records = self.media.list_by_album(id).await?;
        let count = records.len();
        for record in &records {
            self.remove_record(record).await?;
        }

        if !self.albums.delete(id).await? {
            return Err(AppError::AlbumNotFound(id.to_string()));
        }

        tracing::info!(album_id = %id, media_deleted = count, "Album deleted");
        Ok(())
    }

    async fn remove_record(&self, record: &MediaRecord) -> Result<(), AppError> {
        self.delete_bytes(record).await;

        match self.media.delete(record.id).await {
            Ok(true) => {
                tracing::info!(media_id = %record.id, backend = %record.storage_backend, "Media deleted");
                Ok(())
            }
            Ok(false) => Err(AppError::MediaNotFound(record.id.to_string())),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    media_id = %record.id,
                    "Bytes were removed but the media record could not be deleted"
                );
                Err(e)
            }
        }
    }

    async fn delete_bytes(&self, record: &MediaRecord) {
        let Some(storage) = self.storage.for_backend(record.storage_backend) else {
            tracing::warn!(
                media_id = %record.id,
                backend = %record.storage_backend,
                "No adapter configured for record backend, leaving bytes in place"
            );
            return;
        };

        let primary = record.primary_locator.as_str();
        let thumbnail = record
            .thumbnail_locator
            .as_deref()
            .filter(|thumb| !storage.same_object(primary, thumb));
        let locators = std::iter::once(primary).chain(thumbnail);

        for locator in locators {
            match storage.delete(locator).await {
                Ok(DeleteOutcome::Deleted) => {}
                Ok(DeleteOutcome::NotFound) => {
                    tracing::debug!(media_id = %record.id, locator = %locator, "Bytes already absent");
                }
                Err(e) => {
                    tracing::warn!(error = %e, media_id = %record.id, locator = %locator, "Failed to delete bytes");
                }
            }
        }
    }
}
