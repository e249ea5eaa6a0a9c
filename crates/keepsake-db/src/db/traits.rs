//! Store abstractions used by the services.

use async_trait::async_trait;
use keepsake_core::models::{Album, MediaRecord, NewMediaRecord, UpdateAlbumRequest};
use keepsake_core::AppError;
use uuid::Uuid;

/// Album persistence
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// Insert a fully built album
    async fn create(&self, album: Album) -> Result<Album, AppError>;

    /// All albums, newest first
    async fn list(&self) -> Result<Vec<Album>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Album>, AppError>;

    /// Apply a partial update; `None` when the album does not exist
    async fn update(&self, id: Uuid, update: UpdateAlbumRequest)
        -> Result<Option<Album>, AppError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Media record persistence
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn insert(&self, record: NewMediaRecord) -> Result<MediaRecord, AppError>;

    /// Records of one album, newest first. Inline bytes are not loaded.
    async fn list_by_album(&self, album_id: Uuid) -> Result<Vec<MediaRecord>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError>;

    /// Record whose primary or thumbnail locator ends with `/{filename}`
    async fn find_by_locator_suffix(&self, filename: &str)
        -> Result<Option<MediaRecord>, AppError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
