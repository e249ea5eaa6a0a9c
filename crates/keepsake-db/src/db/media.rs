//! Media record repository: persistence for the media_records table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keepsake_core::models::{MediaRecord, NewMediaRecord};
use keepsake_core::{AppError, StorageBackend};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::traits::MediaStore;

const MEDIA_COLUMNS: &str = "id, album_id, title, uploader_name, original_filename, is_video, primary_locator, thumbnail_locator, mime_type, file_size, storage_backend, uploaded_at, is_active";

/// Row type for the media_records table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct MediaRow {
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
    pub storage_backend: StorageBackend,
    pub uploaded_at: DateTime<Utc>,
    pub is_active: bool,
    pub inline_data: Option<Vec<u8>>,
    pub thumbnail_data: Option<Vec<u8>>,
}

impl MediaRow {
    pub fn into_record(self) -> MediaRecord {
        MediaRecord {
            id: self.id,
            album_id: self.album_id,
            title: self.title,
            uploader_name: self.uploader_name,
            original_filename: self.original_filename,
            is_video: self.is_video,
            primary_locator: self.primary_locator,
            thumbnail_locator: self.thumbnail_locator,
            mime_type: self.mime_type,
            file_size: self.file_size,
            storage_backend: self.storage_backend,
            uploaded_at: self.uploaded_at,
            is_active: self.is_active,
            inline_data: self.inline_data,
            thumbnail_data: self.thumbnail_data,
        }
    }
}

/// Postgres-backed media record repository.
#[derive(Clone)]
pub struct PgMediaRepository {
    pool: PgPool,
}

impl PgMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaStore for PgMediaRepository {
    #[tracing::instrument(skip(self, new), fields(db.table = "media_records", db.operation = "insert", album_id = %new.album_id))]
    async fn insert(&self, new: NewMediaRecord) -> Result<MediaRecord, AppError> {
        let record = MediaRecord::from_new(new);

        sqlx::query(
            r#"
            INSERT INTO media_records (
                id, album_id, title, uploader_name, original_filename, is_video,
                primary_locator, thumbnail_locator, mime_type, file_size,
                storage_backend, uploaded_at, is_active, inline_data, thumbnail_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(record.id)
        .bind(record.album_id)
        .bind(&record.title)
        .bind(&record.uploader_name)
        .bind(&record.original_filename)
        .bind(record.is_video)
        .bind(&record.primary_locator)
        .bind(&record.thumbnail_locator)
        .bind(&record.mime_type)
        .bind(record.file_size)
        .bind(record.storage_backend)
        .bind(record.uploaded_at)
        .bind(record.is_active)
        .bind(&record.inline_data)
        .bind(&record.thumbnail_data)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::AlbumNotFound(record.album_id.to_string())
            }
            _ => AppError::from(e),
        })?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_records", db.operation = "select"))]
    async fn list_by_album(&self, album_id: Uuid) -> Result<Vec<MediaRecord>, AppError> {
        let rows: Vec<MediaRow> = sqlx::query_as::<Postgres, MediaRow>(&format!(
            r#"
            SELECT {}, NULL::bytea AS inline_data, NULL::bytea AS thumbnail_data
            FROM media_records
            WHERE album_id = $1
            ORDER BY uploaded_at DESC
            "#,
            MEDIA_COLUMNS
        ))
        .bind(album_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaRow::into_record).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_records", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        let row: Option<MediaRow> = sqlx::query_as::<Postgres, MediaRow>(&format!(
            "SELECT {}, inline_data, thumbnail_data FROM media_records WHERE id = $1",
            MEDIA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaRow::into_record))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_records", db.operation = "select"))]
    async fn find_by_locator_suffix(
        &self,
        filename: &str,
    ) -> Result<Option<MediaRecord>, AppError> {
        // '_' and '%' in filenames must match literally, so no LIKE
        let row: Option<MediaRow> = sqlx::query_as::<Postgres, MediaRow>(&format!(
            r#"
            SELECT {}, inline_data, thumbnail_data
            FROM media_records
            WHERE primary_locator = $1
               OR right(primary_locator, length($1) + 1) = '/' || $1
               OR thumbnail_locator = $1
               OR right(thumbnail_locator, length($1) + 1) = '/' || $1
            ORDER BY uploaded_at DESC
            LIMIT 1
            "#,
            MEDIA_COLUMNS
        ))
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaRow::into_record))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_records", db.operation = "delete"))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
