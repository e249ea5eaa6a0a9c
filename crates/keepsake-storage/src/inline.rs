use crate::keys;
use crate::local::LocalStorage;
use crate::traits::{DeleteOutcome, Location, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;

/// Inline blob storage
///
/// Small files travel inside the media record itself. Anything above
/// `max_inline_bytes` is written to local disk instead and reported with
/// `StorageBackend::Local` provenance.
#[derive(Clone, Debug)]
pub struct InlineBlobStorage {
    local: LocalStorage,
    max_inline_bytes: usize,
}

impl InlineBlobStorage {
    pub fn new(local: LocalStorage, max_inline_bytes: usize) -> Self {
        InlineBlobStorage {
            local,
            max_inline_bytes,
        }
    }

    pub fn max_inline_bytes(&self) -> usize {
        self.max_inline_bytes
    }

    fn inline_object(&self, filename: String, data: Bytes) -> StoredObject {
        StoredObject {
            locator: keys::public_url(self.local.public_base_url(), &filename),
            filename,
            backend: StorageBackend::Inline,
            inline_data: Some(data),
        }
    }
}

#[async_trait]
impl Storage for InlineBlobStorage {
    async fn store(
        &self,
        data: Bytes,
        original_filename: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        if data.len() > self.max_inline_bytes {
            tracing::info!(
                size_bytes = data.len(),
                max_inline_bytes = self.max_inline_bytes,
                "File exceeds inline ceiling, writing to local disk"
            );
            return self.local.store(data, original_filename, content_type).await;
        }

        let filename = keys::generate_filename(original_filename);
        tracing::debug!(
            filename = %filename,
            size_bytes = data.len(),
            "Keeping file inline"
        );
        Ok(self.inline_object(filename, data))
    }

    async fn store_thumbnail(
        &self,
        primary: &StoredObject,
        jpeg: Bytes,
    ) -> StorageResult<StoredObject> {
        if primary.backend != StorageBackend::Inline || jpeg.len() > self.max_inline_bytes {
            return self.local.store_thumbnail(primary, jpeg).await;
        }
        let filename = keys::thumbnail_filename(&primary.filename);
        Ok(self.inline_object(filename, jpeg))
    }

    /// Oversize uploads were written to disk; everything else is in the record.
    async fn locate(&self, locator: &str) -> StorageResult<Location> {
        match self.local.locate(locator).await {
            Ok(location) => Ok(location),
            Err(StorageError::NotFound(_)) => Ok(Location::Inline),
            Err(e) => Err(e),
        }
    }

    /// Inline bytes go away with the record, so only disk fallbacks are removed here.
    async fn delete(&self, locator: &str) -> StorageResult<DeleteOutcome> {
        self.local.delete(locator).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Inline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage(max: usize) -> (TempDir, InlineBlobStorage) {
        let dir = TempDir::new().unwrap();
        let local = LocalStorage::new(dir.path(), "http://localhost:3001")
            .await
            .unwrap();
        (dir, InlineBlobStorage::new(local, max))
    }

    #[tokio::test]
    async fn small_files_stay_inline() {
        let (dir, storage) = storage(16).await;
        let stored = storage
            .store(Bytes::from_static(b"tiny"), "a.jpg", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(stored.backend, StorageBackend::Inline);
        assert_eq!(stored.inline_data.as_deref(), Some(&b"tiny"[..]));
        assert!(stored.locator.ends_with(&format!("/uploads/{}", stored.filename)));
        assert!(!dir.path().join(&stored.filename).exists());
    }

    #[tokio::test]
    async fn files_at_the_ceiling_stay_inline() {
        let (_dir, storage) = storage(4).await;
        let stored = storage
            .store(Bytes::from_static(b"four"), "a.jpg", "image/jpeg")
            .await
            .unwrap();
        assert_eq!(stored.backend, StorageBackend::Inline);
    }

    #[tokio::test]
    async fn oversize_files_fall_back_to_disk() {
        let (dir, storage) = storage(4).await;
        let stored = storage
            .store(Bytes::from_static(b"too large"), "a.mp4", "video/mp4")
            .await
            .unwrap();

        assert_eq!(stored.backend, StorageBackend::Local);
        assert!(stored.inline_data.is_none());
        assert!(dir.path().join(&stored.filename).exists());

        let thumb = storage
            .store_thumbnail(&stored, Bytes::from_static(b"jp"))
            .await
            .unwrap();
        assert_eq!(thumb.backend, StorageBackend::Local);
        assert!(dir.path().join(&thumb.filename).exists());

        assert!(matches!(
            storage.locate(&stored.locator).await.unwrap(),
            Location::File(_)
        ));
        assert_eq!(
            storage.delete(&stored.locator).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert!(!dir.path().join(&stored.filename).exists());
    }

    #[tokio::test]
    async fn inline_thumbnail_for_inline_primary() {
        let (_dir, storage) = storage(64).await;
        let primary = storage
            .store(Bytes::from_static(b"video"), "clip.webm", "video/webm")
            .await
            .unwrap();
        let thumb = storage
            .store_thumbnail(&primary, Bytes::from_static(b"jpeg"))
            .await
            .unwrap();

        assert_eq!(thumb.backend, StorageBackend::Inline);
        assert!(thumb.filename.starts_with("thumb_"));
        assert_eq!(storage.locate(&thumb.locator).await.unwrap(), Location::Inline);
    }
}
