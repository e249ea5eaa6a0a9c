//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result of persisting bytes through an adapter.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// What the media record stores: URL path, absolute URL or key.
    pub locator: String,
    /// Generated filename (last locator segment).
    pub filename: String,
    /// The backend that actually holds the bytes. The inline adapter reports
    /// `Local` when it fell back to disk.
    pub backend: StorageBackend,
    /// Present only when the bytes live inside the record.
    pub inline_data: Option<Bytes>,
}

/// How to serve a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Stream this file from disk.
    File(PathBuf),
    /// Send the client elsewhere.
    Redirect(String),
    /// Bytes are carried in the media record.
    Inline,
}

/// Outcome of a delete. Absent bytes are not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Storage abstraction trait
///
/// Adapters are constructed once at startup and shared behind `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist an uploaded file under a freshly generated name.
    async fn store(
        &self,
        data: Bytes,
        original_filename: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject>;

    /// Persist a JPEG thumbnail for an already stored primary.
    async fn store_thumbnail(
        &self,
        primary: &StoredObject,
        jpeg: Bytes,
    ) -> StorageResult<StoredObject>;

    /// A thumbnail the backend can derive by itself, without frame extraction.
    fn derived_thumbnail(&self, _primary: &StoredObject) -> Option<String> {
        None
    }

    /// Whether two locators address the same stored object, so deleting one
    /// already removes the other.
    fn same_object(&self, a: &str, b: &str) -> bool {
        a == b
    }

    /// Resolve a locator into something servable.
    async fn locate(&self, locator: &str) -> StorageResult<Location>;

    /// Delete the bytes behind a locator.
    async fn delete(&self, locator: &str) -> StorageResult<DeleteOutcome>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
