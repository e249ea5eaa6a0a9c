//! In-memory store for tests and `METADATA_STORE=memory`.
//!
//! Contents are lost on restart.

use async_trait::async_trait;
use keepsake_core::models::{
    media::locator_ends_with, Album, MediaRecord, NewMediaRecord, UpdateAlbumRequest,
};
use keepsake_core::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{AlbumStore, MediaStore};

/// Process-local implementation of both store traits.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    albums: Arc<RwLock<HashMap<Uuid, Album>>>,
    media: Arc<RwLock<HashMap<Uuid, MediaRecord>>>,
    fail_media_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent media inserts fail with a database-style error.
    pub fn fail_media_writes(&self, fail: bool) {
        self.fail_media_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn media_count(&self) -> usize {
        self.media.read().await.len()
    }
}

#[async_trait]
impl AlbumStore for InMemoryStore {
    async fn create(&self, album: Album) -> Result<Album, AppError> {
        self.albums.write().await.insert(album.id, album.clone());
        Ok(album)
    }

    async fn list(&self) -> Result<Vec<Album>, AppError> {
        let mut albums: Vec<Album> = self.albums.read().await.values().cloned().collect();
        albums.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(albums)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Album>, AppError> {
        Ok(self.albums.read().await.get(&id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        update: UpdateAlbumRequest,
    ) -> Result<Option<Album>, AppError> {
        let mut albums = self.albums.write().await;
        Ok(albums.get_mut(&id).map(|album| {
            album.apply(update);
            album.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.albums.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl MediaStore for InMemoryStore {
    async fn insert(&self, new: NewMediaRecord) -> Result<MediaRecord, AppError> {
        if self.fail_media_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "media record write rejected".to_string(),
            ));
        }
        if !self.albums.read().await.contains_key(&new.album_id) {
            return Err(AppError::AlbumNotFound(new.album_id.to_string()));
        }

        let record = MediaRecord::from_new(new);
        self.media.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_by_album(&self, album_id: Uuid) -> Result<Vec<MediaRecord>, AppError> {
        let mut records: Vec<MediaRecord> = self
            .media
            .read()
            .await
            .values()
            .filter(|r| r.album_id == album_id)
            .cloned()
            .map(|mut r| {
                r.inline_data = None;
                r.thumbnail_data = None;
                r
            })
            .collect();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(records)
    }

    async fn get(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        Ok(self.media.read().await.get(&id).cloned())
    }

    async fn find_by_locator_suffix(
        &self,
        filename: &str,
    ) -> Result<Option<MediaRecord>, AppError> {
        let media = self.media.read().await;
        let mut matches: Vec<&MediaRecord> = media
            .values()
            .filter(|r| {
                locator_ends_with(&r.primary_locator, filename)
                    || r
                        .thumbnail_locator
                        .as_deref()
                        .is_some_and(|t| locator_ends_with(t, filename))
            })
            .collect();
        matches.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(matches.first().map(|r| (*r).clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.media.write().await.remove(&id).is_some())
    }
}
