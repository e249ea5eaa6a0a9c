//! Configuration validation
//!
//! Checks that only matter once the server is about to start; value-level
//! checks live in `Config::validate`.

use anyhow::Result;
use keepsake_core::{Config, MetadataStoreKind, StorageBackend};

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() {
        if config.cors_origins().iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS configured to allow all origins (*) in production. \
                Set specific allowed origins via CORS_ORIGINS."
            ));
        }
        if config.metadata_store() == MetadataStoreKind::Memory {
            tracing::warn!("In-memory metadata store in production; data is lost on restart");
        }
    }

    if config.metadata_store() == MetadataStoreKind::Postgres {
        if config.db_max_connections() == 0 {
            return Err(anyhow::anyhow!("Database max connections cannot be 0"));
        }
        if config.db_timeout_seconds() == 0 {
            return Err(anyhow::anyhow!("Database timeout cannot be 0"));
        }
    }

    if config.storage_backend() == StorageBackend::Inline
        && config.inline_max_bytes() > config.max_upload_bytes()
    {
        tracing::info!(
            inline_max_bytes = config.inline_max_bytes(),
            max_upload_bytes = config.max_upload_bytes(),
            "Inline ceiling exceeds upload ceiling; every accepted upload stays inline"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_core::AppConfig;

    fn memory_config() -> AppConfig {
        let mut app = AppConfig::default();
        app.base.metadata_store = MetadataStoreKind::Memory;
        app
    }

    #[test]
    fn default_memory_config_passes() {
        assert!(validate_config(&Config::new(memory_config())).is_ok());
    }

    #[test]
    fn remote_backend_without_credentials_fails() {
        let mut app = memory_config();
        app.storage_backend = StorageBackend::Remote;
        app.remote = None;
        assert!(validate_config(&Config::new(app)).is_err());
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let mut app = memory_config();
        app.base.environment = "production".to_string();
        app.base.cors_origins = vec!["*".to_string()];
        assert!(validate_config(&Config::new(app)).is_err());
    }
}
