use crate::keys::{self, filename_from_locator, is_safe_filename};
use crate::traits::{DeleteOutcome, Location, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Files live flat in one directory and are served back from
/// `{public_base_url}/uploads/{filename}`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Uploads directory (e.g., "./uploads")
    /// * `public_base_url` - Origin the API is reachable at (e.g., "http://localhost:3001")
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    /// Convert a bare filename to a path inside the uploads directory.
    ///
    /// Rejects traversal sequences and separators, then checks the canonical
    /// path when the file exists.
    pub fn filename_to_path(&self, filename: &str) -> StorageResult<PathBuf> {
        if !is_safe_filename(filename) {
            return Err(StorageError::InvalidKey(format!(
                "Filename contains invalid characters: {}",
                filename
            )));
        }

        let path = self.base_path.join(filename);

        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Filename resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn locator_to_path(&self, locator: &str) -> StorageResult<PathBuf> {
        let filename = filename_from_locator(locator)
            .ok_or_else(|| StorageError::InvalidKey(format!("Empty locator: {}", locator)))?;
        self.filename_to_path(filename)
    }

    /// Write `data` to `filename` and return the stored object.
    pub(crate) async fn write_file(&self, filename: &str, data: &[u8]) -> StorageResult<StoredObject> {
        let path = self.filename_to_path(filename)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let locator = keys::public_url(&self.public_base_url, filename);

        tracing::info!(
            path = %path.display(),
            locator = %locator,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(StoredObject {
            locator,
            filename: filename.to_string(),
            backend: StorageBackend::Local,
            inline_data: None,
        })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(
        &self,
        data: Bytes,
        original_filename: &str,
        _content_type: &str,
    ) -> StorageResult<StoredObject> {
        let filename = keys::generate_filename(original_filename);
        self.write_file(&filename, &data).await
    }

    async fn store_thumbnail(
        &self,
        primary: &StoredObject,
        jpeg: Bytes,
    ) -> StorageResult<StoredObject> {
        let filename = keys::thumbnail_filename(&primary.filename);
        self.write_file(&filename, &jpeg).await
    }

    async fn locate(&self, locator: &str) -> StorageResult<Location> {
        let path = self.locator_to_path(locator)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(locator.to_string()));
        }

        Ok(Location::File(path))
    }

    async fn delete(&self, locator: &str) -> StorageResult<DeleteOutcome> {
        let path = self.locator_to_path(locator)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Local storage delete successful");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "File already absent");
                Ok(DeleteOutcome::NotFound)
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3001/")
            .await
            .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn store_writes_file_and_returns_public_locator() {
        let (dir, storage) = storage().await;

        let stored = storage
            .store(Bytes::from_static(b"jpeg"), "Cake.JPG", "image/jpeg")
            .await
            .unwrap();

        assert!(stored.filename.ends_with(".jpg"));
        assert_eq!(
            stored.locator,
            format!("http://localhost:3001/uploads/{}", stored.filename)
        );
        assert_eq!(stored.backend, StorageBackend::Local);
        let on_disk = std::fs::read(dir.path().join(&stored.filename)).unwrap();
        assert_eq!(on_disk, b"jpeg");
    }

    #[tokio::test]
    async fn thumbnail_is_named_after_primary() {
        let (dir, storage) = storage().await;
        let primary = storage
            .store(Bytes::from_static(b"video"), "dance.mp4", "video/mp4")
            .await
            .unwrap();

        let thumb = storage
            .store_thumbnail(&primary, Bytes::from_static(b"frame"))
            .await
            .unwrap();

        let stem = primary.filename.trim_end_matches(".mp4");
        assert_eq!(thumb.filename, format!("thumb_{}.jpg", stem));
        assert!(dir.path().join(&thumb.filename).exists());
    }

    #[tokio::test]
    async fn locate_existing_and_missing_files() {
        let (_dir, storage) = storage().await;
        let stored = storage
            .store(Bytes::from_static(b"x"), "a.png", "image/png")
            .await
            .unwrap();

        match storage.locate(&stored.locator).await.unwrap() {
            Location::File(path) => assert!(path.ends_with(&stored.filename)),
            other => panic!("unexpected location {:?}", other),
        }

        assert!(matches!(
            storage.locate("missing.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, storage) = storage().await;
        let stored = storage
            .store(Bytes::from_static(b"x"), "a.gif", "image/gif")
            .await
            .unwrap();

        assert_eq!(
            storage.delete(&stored.locator).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            storage.delete(&stored.locator).await.unwrap(),
            DeleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_dir, storage) = storage().await;
        assert!(matches!(
            storage.locate("..").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.filename_to_path("..\\secret"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
