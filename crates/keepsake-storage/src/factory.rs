use crate::{
    InlineBlobStorage, LocalStorage, RemoteHostStorage, Storage, StorageBackend, StorageError,
    StorageResult,
};
use keepsake_core::Config;
use std::sync::Arc;

/// Every storage adapter the running configuration can reach.
///
/// `active` receives new uploads. Local disk is always present so files written
/// under an earlier configuration can still be read and deleted; remote is
/// present whenever credentials are configured.
#[derive(Clone)]
pub struct StorageSet {
    active: Arc<dyn Storage>,
    local: Arc<LocalStorage>,
    inline: Arc<InlineBlobStorage>,
    remote: Option<Arc<RemoteHostStorage>>,
}

impl StorageSet {
    pub fn new(
        active: StorageBackend,
        local: LocalStorage,
        inline_max_bytes: usize,
        remote: Option<RemoteHostStorage>,
    ) -> StorageResult<Self> {
        let local = Arc::new(local);
        let inline = Arc::new(InlineBlobStorage::new(
            local.as_ref().clone(),
            inline_max_bytes,
        ));
        let remote = remote.map(Arc::new);

        let active: Arc<dyn Storage> = match active {
            StorageBackend::Local => local.clone(),
            StorageBackend::Inline => inline.clone(),
            StorageBackend::Remote => match &remote {
                Some(remote) => remote.clone(),
                None => {
                    return Err(StorageError::ConfigError(
                        "Remote storage backend selected but remote host is not configured"
                            .to_string(),
                    ))
                }
            },
        };

        Ok(StorageSet {
            active,
            local,
            inline,
            remote,
        })
    }

    /// Adapter receiving new uploads.
    pub fn active(&self) -> Arc<dyn Storage> {
        self.active.clone()
    }

    /// Always-available local disk adapter.
    pub fn local(&self) -> &LocalStorage {
        &self.local
    }

    /// Adapter matching a record's provenance, if it can be built here.
    pub fn for_backend(&self, backend: StorageBackend) -> Option<Arc<dyn Storage>> {
        match backend {
            StorageBackend::Local => Some(self.local.clone()),
            StorageBackend::Inline => Some(self.inline.clone()),
            StorageBackend::Remote => self
                .remote
                .as_ref()
                .map(|r| r.clone() as Arc<dyn Storage>),
        }
    }
}

/// Create the storage adapters based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<StorageSet> {
    let local = LocalStorage::new(config.uploads_dir(), config.public_base_url()).await?;

    let remote = match config.remote() {
        Some(remote_config) => Some(RemoteHostStorage::new(remote_config.clone())?),
        None => None,
    };

    let set = StorageSet::new(
        config.storage_backend(),
        local,
        config.inline_max_bytes(),
        remote,
    )?;

    tracing::info!(
        active = %config.storage_backend(),
        uploads_dir = %config.uploads_dir().display(),
        remote_configured = config.remote().is_some(),
        "Storage adapters initialized"
    );

    Ok(set)
}
