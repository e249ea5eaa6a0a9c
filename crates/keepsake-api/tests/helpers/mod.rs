//! Test helpers: build AppState and router over the in-memory store.
//!
//! Run from workspace root: `cargo test -p keepsake-api`.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use bytes::Bytes;
use keepsake_api::setup::database::Stores;
use keepsake_api::setup::{routes, services};
use keepsake_core::{AppConfig, Config, MetadataStoreKind, RemoteHostConfig, StorageBackend};
use keepsake_db::InMemoryStore;
use keepsake_processing::{ThumbnailError, ThumbnailGenerator};
use keepsake_storage::{LocalStorage, RemoteHostStorage, StorageSet};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const PUBLIC_BASE_URL: &str = "http://localhost:3001";

/// Test application: server plus the state it shares with other instances.
pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryStore,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Thumbnailer returning a fixed JPEG.
pub struct FixedThumbnailer;

#[async_trait]
impl ThumbnailGenerator for FixedThumbnailer {
    async fn generate(&self, _video: &[u8], _extension: &str) -> Result<Bytes, ThumbnailError> {
        Ok(Bytes::from_static(fixtures::TINY_JPEG))
    }
}

/// Thumbnailer that always fails, like a missing ffmpeg binary.
pub struct BrokenThumbnailer;

#[async_trait]
impl ThumbnailGenerator for BrokenThumbnailer {
    async fn generate(&self, _video: &[u8], _extension: &str) -> Result<Bytes, ThumbnailError> {
        Err(ThumbnailError::NonZeroExit(1))
    }
}

pub fn test_config(uploads_dir: &Path, backend: StorageBackend) -> AppConfig {
    let mut config = AppConfig::default();
    config.base.metadata_store = MetadataStoreKind::Memory;
    config.storage_backend = backend;
    config.uploads_dir = uploads_dir.to_path_buf();
    config.public_base_url = PUBLIC_BASE_URL.to_string();
    config.thumbnails_enabled = false;
    config
}

pub fn remote_config(api_url: String) -> RemoteHostConfig {
    RemoteHostConfig {
        api_url,
        api_key: "test-key".to_string(),
        api_secret: "test-secret".to_string(),
        folder: "wedding_photos".to_string(),
        timeout_secs: 5,
    }
}

/// Build an app over an existing store so several configurations can share data.
pub async fn build_app(
    config: AppConfig,
    store: InMemoryStore,
    thumbnailer: Option<Arc<dyn ThumbnailGenerator>>,
) -> TestApp {
    let router = build_router(config, store.clone(), thumbnailer).await;
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp { server, store }
}

/// The bare router, for requests that need control over the raw body.
pub async fn build_router(
    config: AppConfig,
    store: InMemoryStore,
    thumbnailer: Option<Arc<dyn ThumbnailGenerator>>,
) -> Router {
    let config = Config::new(config);

    let local = LocalStorage::new(config.uploads_dir(), config.public_base_url())
        .await
        .expect("Failed to create local storage");
    let remote = config
        .remote()
        .map(|r| RemoteHostStorage::new(r.clone()).expect("Failed to create remote storage"));
    let storage = StorageSet::new(
        config.storage_backend(),
        local,
        config.inline_max_bytes(),
        remote,
    )
    .expect("Failed to create storage set");

    let state = services::initialize_services(
        config.clone(),
        Stores::in_memory(store),
        storage,
        thumbnailer,
    );
    routes::setup_routes(&config, state).expect("Failed to build routes")
}

/// Local-disk app with a fresh store; keep the returned directory alive.
pub async fn setup_test_app() -> (TestApp, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let app = build_app(
        test_config(dir.path(), StorageBackend::Local),
        InMemoryStore::new(),
        Some(Arc::new(FixedThumbnailer)),
    )
    .await;
    (app, dir)
}

/// Create an album through the API and return its id.
pub async fn create_album(client: &TestServer, title: &str) -> String {
    let response = client
        .post("/api/albums")
        .json(&serde_json::json!({
            "title": title,
            "eventDate": "2024-08-24",
            "coupleNames": { "first": "Elif", "second": "Can" },
            "description": "Garden ceremony"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<serde_json::Value>()["id"]
        .as_str()
        .expect("album id")
        .to_string()
}

/// Last path segment of a locator.
pub fn filename_of(locator: &str) -> String {
    locator.rsplit('/').next().unwrap_or(locator).to_string()
}
