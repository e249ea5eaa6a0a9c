//! Metadata store setup: Postgres with migrations, or the in-memory store.

use anyhow::{Context, Result};
use keepsake_core::{Config, MetadataStoreKind};
use keepsake_db::{AlbumStore, InMemoryStore, MediaStore, PgAlbumRepository, PgMediaRepository};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Album and media stores selected by `METADATA_STORE`.
#[derive(Clone)]
pub struct Stores {
    pub albums: Arc<dyn AlbumStore>,
    pub media: Arc<dyn MediaStore>,
}

impl Stores {
    pub fn in_memory(store: InMemoryStore) -> Self {
        Stores {
            albums: Arc::new(store.clone()),
            media: Arc::new(store),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Stores {
            albums: Arc::new(PgAlbumRepository::new(pool.clone())),
            media: Arc::new(PgMediaRepository::new(pool)),
        }
    }
}

pub async fn setup_stores(config: &Config) -> Result<Stores> {
    match config.metadata_store() {
        MetadataStoreKind::Memory => {
            tracing::warn!("Using in-memory metadata store; albums and records are lost on restart");
            Ok(Stores::in_memory(InMemoryStore::new()))
        }
        MetadataStoreKind::Postgres => Ok(Stores::postgres(setup_database(config).await?)),
    }
}

/// Setup database connection pool and run migrations
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url()
        .context("DATABASE_URL is required for the postgres metadata store")?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    // Workspace migrations/ relative to this crate's root
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
