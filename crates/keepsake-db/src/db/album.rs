//! Album repository: CRUD for the albums table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keepsake_core::models::{Album, CoupleNames, UpdateAlbumRequest};
use keepsake_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::traits::AlbumStore;

const ALBUM_COLUMNS: &str = "id, title, event_date, couple_first, couple_second, cover_image_ref, description, created_at, updated_at";

/// Row type for the albums table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct AlbumRow {
    pub id: Uuid,
    pub title: String,
    pub event_date: String,
    pub couple_first: String,
    pub couple_second: String,
    pub cover_image_ref: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AlbumRow {
    pub fn into_album(self) -> Album {
        Album {
            id: self.id,
            title: self.title,
            event_date: self.event_date,
            couple_names: CoupleNames {
                first: self.couple_first,
                second: self.couple_second,
            },
            cover_image_ref: self.cover_image_ref,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Postgres-backed album repository.
#[derive(Clone)]
pub struct PgAlbumRepository {
    pool: PgPool,
}

impl PgAlbumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlbumStore for PgAlbumRepository {
    #[tracing::instrument(skip(self, album), fields(db.table = "albums", db.operation = "insert", album_id = %album.id))]
    async fn create(&self, album: Album) -> Result<Album, AppError> {
        let row: AlbumRow = sqlx::query_as::<Postgres, AlbumRow>(&format!(
            r#"
            INSERT INTO albums (id, title, event_date, couple_first, couple_second, cover_image_ref, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            ALBUM_COLUMNS
        ))
        .bind(album.id)
        .bind(&album.title)
        .bind(&album.event_date)
        .bind(&album.couple_names.first)
        .bind(&album.couple_names.second)
        .bind(&album.cover_image_ref)
        .bind(&album.description)
        .bind(album.created_at)
        .bind(album.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_album())
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Album>, AppError> {
        let rows: Vec<AlbumRow> = sqlx::query_as::<Postgres, AlbumRow>(&format!(
            "SELECT {} FROM albums ORDER BY created_at DESC",
            ALBUM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AlbumRow::into_album).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> Result<Option<Album>, AppError> {
        let row: Option<AlbumRow> = sqlx::query_as::<Postgres, AlbumRow>(&format!(
            "SELECT {} FROM albums WHERE id = $1",
            ALBUM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AlbumRow::into_album))
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "albums", db.operation = "update"))]
    async fn update(
        &self,
        id: Uuid,
        update: UpdateAlbumRequest,
    ) -> Result<Option<Album>, AppError> {
        let (first, second) = match update.couple_names {
            Some(couple) => (
                Some(couple.first.trim().to_string()),
                Some(couple.second.trim().to_string()),
            ),
            None => (None, None),
        };

        let row: Option<AlbumRow> = sqlx::query_as::<Postgres, AlbumRow>(&format!(
            r#"
            UPDATE albums SET
                title = COALESCE($2, title),
                event_date = COALESCE($3, event_date),
                couple_first = COALESCE($4, couple_first),
                couple_second = COALESCE($5, couple_second),
                cover_image_ref = COALESCE($6, cover_image_ref),
                description = COALESCE($7, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ALBUM_COLUMNS
        ))
        .bind(id)
        .bind(update.title.map(|t| t.trim().to_string()))
        .bind(update.event_date.map(|d| d.trim().to_string()))
        .bind(first)
        .bind(second)
        .bind(update.cover_image_ref)
        .bind(update.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AlbumRow::into_album))
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "delete"))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
