//! Media resolution: turn a requested filename into something servable.
//!
//! Lookup order:
//! 1. the media record whose primary or thumbnail locator ends in the filename
//! 2. remote locators redirect, inline bytes are served from the record, other
//!    locators go through the adapter matching the record's provenance
//! 3. a direct read of the uploads directory, which covers files written
//!    before records carried provenance
//!
//! The active backend is never consulted, so switching `STORAGE_BACKEND` does
//! not break older records.

use bytes::Bytes;
use keepsake_core::media_kind::mime_for_filename;
use keepsake_core::models::MediaRecord;
use keepsake_core::StorageBackend;
use keepsake_db::MediaStore;
use keepsake_storage::keys::{is_safe_filename, is_thumbnail_filename};
use keepsake_storage::{Location, Storage, StorageError, StorageSet};
use std::path::PathBuf;
use std::sync::Arc;

const THUMBNAIL_MIME: &str = "image/jpeg";

/// How a filename should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Redirect(String),
    File { path: PathBuf, mime_type: String },
    Bytes { data: Bytes, mime_type: String },
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResolveError {
    NotFound,
}

#[derive(Clone)]
pub struct MediaResolver {
    media: Arc<dyn MediaStore>,
    storage: StorageSet,
    /// Public base URL with a trailing slash, so `:30010` never passes for `:3001`.
    public_prefix: String,
}

/// Which locator of a record the filename matched.
struct Target<'a> {
    locator: &'a str,
    inline: Option<&'a [u8]>,
    mime_type: String,
}

impl MediaResolver {
    pub fn new(media: Arc<dyn MediaStore>, storage: StorageSet, public_base_url: &str) -> Self {
        Self {
            media,
            storage,
            public_prefix: format!("{}/", public_base_url.trim_end_matches('/')),
        }
    }

    #[tracing::instrument(skip(self), fields(operation = "resolve_media"))]
    pub async fn resolve(&self, filename: &str) -> Result<Resolved, ResolveError> {
        if !is_safe_filename(filename) {
            tracing::debug!(filename = %filename, "Rejected unsafe filename");
            return Err(ResolveError::NotFound);
        }

        let record = match self.media.find_by_locator_suffix(filename).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, filename = %filename, "Record lookup failed, trying uploads directory");
                None
            }
        };

        if let Some(record) = record {
            if let Some(resolved) = self.from_record(&record, filename).await {
                return Ok(resolved);
            }
            tracing::debug!(media_id = %record.id, filename = %filename, "Record had nothing servable, trying uploads directory");
        }

        self.from_uploads_dir(filename).await
    }

    async fn from_record(&self, record: &MediaRecord, filename: &str) -> Option<Resolved> {
        let target = target_for(record, filename);

        if self.is_remote_locator(record, target.locator) {
            return Some(Resolved::Redirect(target.locator.to_string()));
        }

        if let Some(data) = target.inline {
            return Some(Resolved::Bytes {
                data: Bytes::copy_from_slice(data),
                mime_type: target.mime_type,
            });
        }

        let adapter = self.storage.for_backend(record.storage_backend)?;
        match adapter.locate(target.locator).await {
            Ok(Location::File(path)) => Some(Resolved::File {
                path,
                mime_type: target.mime_type,
            }),
            Ok(Location::Redirect(url)) => Some(Resolved::Redirect(url)),
            Ok(Location::Inline) => None,
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                tracing::warn!(error = %e, media_id = %record.id, "Locating stored bytes failed");
                None
            }
        }
    }

    async fn from_uploads_dir(&self, filename: &str) -> Result<Resolved, ResolveError> {
        match self.storage.local().locate(filename).await {
            Ok(Location::File(path)) => Ok(Resolved::File {
                path,
                mime_type: mime_for_filename(filename).to_string(),
            }),
            Ok(_) | Err(StorageError::NotFound(_)) => Err(ResolveError::NotFound),
            Err(e) => {
                tracing::warn!(error = %e, filename = %filename, "Uploads directory read failed");
                Err(ResolveError::NotFound)
            }
        }
    }

    /// Remote provenance, or an absolute URL that this service does not serve.
    fn is_remote_locator(&self, record: &MediaRecord, locator: &str) -> bool {
        if record.storage_backend == StorageBackend::Remote {
            return true;
        }
        let absolute = locator.starts_with("http://") || locator.starts_with("https://");
        absolute && !locator.starts_with(&self.public_prefix)
    }
}

fn target_for<'a>(record: &'a MediaRecord, filename: &str) -> Target<'a> {
    let wants_thumbnail = record.thumbnail_matches(filename)
        && (is_thumbnail_filename(filename) || !record.primary_matches(filename));

    match (&record.thumbnail_locator, wants_thumbnail) {
        (Some(locator), true) => Target {
            locator: locator.as_str(),
            inline: record.thumbnail_data.as_deref(),
            mime_type: THUMBNAIL_MIME.to_string(),
        },
        _ => Target {
            locator: record.primary_locator.as_str(),
            inline: record.inline_data.as_deref(),
            mime_type: record
                .mime_type
                .clone()
                .unwrap_or_else(|| mime_for_filename(filename).to_string()),
        },
    }
}
