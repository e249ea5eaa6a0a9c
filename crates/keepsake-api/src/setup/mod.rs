//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use keepsake_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        metadata_store = %config.metadata_store(),
        "Configuration loaded and validated successfully"
    );

    let stores = database::setup_stores(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let thumbnailer = services::thumbnailer_from_config(&config);

    let state = services::initialize_services(config.clone(), stores, storage, thumbnailer);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
