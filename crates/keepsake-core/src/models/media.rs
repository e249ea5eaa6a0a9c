use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage_types::StorageBackend;

/// A photo or video uploaded into an album.
///
/// `primary_locator` and `thumbnail_locator` are whatever the storage adapter
/// returned: a local URL path, an absolute remote URL or a storage key.
/// Inline bytes are only populated for the inline backend and are never
/// serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: Uuid,
    pub album_id: Uuid,
    pub title: String,
    pub uploader_name: String,
    pub original_filename: String,
    pub is_video: bool,
    pub primary_locator: String,
    pub thumbnail_locator: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: i64,
    #[schema(value_type = String)]
    pub storage_backend: StorageBackend,
    pub uploaded_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(skip)]
    pub inline_data: Option<Vec<u8>>,
    #[serde(skip)]
    pub thumbnail_data: Option<Vec<u8>>,
}

/// Everything the ingestion pipeline knows before the record exists.
#[derive(Debug, Clone)]
pub struct NewMediaRecord {
    pub album_id: Uuid,
    pub title: String,
    pub uploader_name: String,
    pub original_filename: String,
    pub is_video: bool,
    pub primary_locator: String,
    pub thumbnail_locator: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: i64,
    pub storage_backend: StorageBackend,
    pub inline_data: Option<Vec<u8>>,
    pub thumbnail_data: Option<Vec<u8>>,
}

impl MediaRecord {
    pub fn from_new(new: NewMediaRecord) -> Self {
        MediaRecord {
            id: Uuid::new_v4(),
            album_id: new.album_id,
            title: new.title,
            uploader_name: new.uploader_name,
            original_filename: new.original_filename,
            is_video: new.is_video,
            primary_locator: new.primary_locator,
            thumbnail_locator: new.thumbnail_locator,
            mime_type: new.mime_type,
            file_size: new.file_size,
            storage_backend: new.storage_backend,
            uploaded_at: Utc::now(),
            is_active: true,
            inline_data: new.inline_data,
            thumbnail_data: new.thumbnail_data,
        }
    }

    /// Whether `filename` names the last path segment of the thumbnail locator.
    pub fn thumbnail_matches(&self, filename: &str) -> bool {
        self.thumbnail_locator
            .as_deref()
            .is_some_and(|loc| locator_ends_with(loc, filename))
    }

    /// Whether `filename` names the last path segment of the primary locator.
    pub fn primary_matches(&self, filename: &str) -> bool {
        locator_ends_with(&self.primary_locator, filename)
    }
}

/// Suffix match on a locator's final path segment.
pub fn locator_ends_with(locator: &str, filename: &str) -> bool {
    locator == filename || locator.ends_with(&format!("/{}", filename))
}
