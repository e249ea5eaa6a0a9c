//! Storage adapter setup

use anyhow::{Context, Result};
use keepsake_core::Config;
use keepsake_storage::{create_storage, StorageSet};

pub async fn setup_storage(config: &Config) -> Result<StorageSet> {
    create_storage(config)
        .await
        .context("Failed to initialize storage adapters")
}
