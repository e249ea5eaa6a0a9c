//! Application state shared by every handler.

use keepsake_core::Config;
use keepsake_db::{AlbumStore, MediaStore};
use keepsake_processing::MediaIngestionPipeline;
use keepsake_storage::StorageSet;
use std::sync::Arc;

use crate::services::media_lifecycle::MediaLifecycleService;
use crate::services::resolution::MediaResolver;

/// Built once at startup and handed to the router as `Arc<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub albums: Arc<dyn AlbumStore>,
    pub media: Arc<dyn MediaStore>,
    pub storage: StorageSet,
    pub pipeline: MediaIngestionPipeline,
    pub resolver: MediaResolver,
    pub lifecycle: MediaLifecycleService,
}
