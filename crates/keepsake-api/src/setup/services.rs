//! Wires stores, storage and processing into [`AppState`].

use super::database::Stores;
use crate::services::media_lifecycle::MediaLifecycleService;
use crate::services::resolution::MediaResolver;
use crate::state::AppState;
use keepsake_core::Config;
use keepsake_processing::{
    FfmpegThumbnailer, MediaIngestionPipeline, MediaValidator, ThumbnailGenerator,
};
use keepsake_storage::StorageSet;
use std::sync::Arc;
use std::time::Duration;

/// ffmpeg-backed thumbnailer, or none when thumbnails are disabled.
pub fn thumbnailer_from_config(config: &Config) -> Option<Arc<dyn ThumbnailGenerator>> {
    if !config.thumbnails_enabled() {
        tracing::info!("Video thumbnails disabled");
        return None;
    }
    Some(Arc::new(FfmpegThumbnailer::new(
        config.ffmpeg_path(),
        Duration::from_secs(config.thumbnail_timeout_secs()),
    )))
}

pub fn initialize_services(
    config: Config,
    stores: Stores,
    storage: StorageSet,
    thumbnailer: Option<Arc<dyn ThumbnailGenerator>>,
) -> Arc<AppState> {
    let validator = MediaValidator::new(
        config.max_upload_bytes(),
        config.allowed_extensions().to_vec(),
    );

    let pipeline = MediaIngestionPipeline::new(
        stores.albums.clone(),
        stores.media.clone(),
        storage.active(),
        thumbnailer,
        validator,
    );
    let resolver = MediaResolver::new(
        stores.media.clone(),
        storage.clone(),
        config.public_base_url(),
    );
    let lifecycle =
        MediaLifecycleService::new(stores.albums.clone(), stores.media.clone(), storage.clone());

    Arc::new(AppState {
        config,
        albums: stores.albums,
        media: stores.media,
        storage,
        pipeline,
        resolver,
        lifecycle,
    })
}
