//! Configuration module
//!
//! Configuration is read once at startup from the environment (a `.env` file is
//! honoured) and passed by value into the components that need it.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::media_kind::DEFAULT_ALLOWED_EXTENSIONS;
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 3001;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 60;
const INLINE_MAX_SIZE_MB: usize = 40;
const REMOTE_HOST_TIMEOUT_SECS: u64 = 60;
const THUMBNAIL_TIMEOUT_SECS: u64 = 30;
const REMOTE_HOST_FOLDER: &str = "wedding_photos";
const UPLOADS_DIR: &str = "./uploads";

/// Where album and media records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataStoreKind {
    Postgres,
    Memory,
}

impl FromStr for MetadataStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(MetadataStoreKind::Postgres),
            "memory" | "in-memory" => Ok(MetadataStoreKind::Memory),
            _ => Err(anyhow::anyhow!("Invalid metadata store: {}", s)),
        }
    }
}

impl Display for MetadataStoreKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MetadataStoreKind::Postgres => write!(f, "postgres"),
            MetadataStoreKind::Memory => write!(f, "memory"),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub metadata_store: MetadataStoreKind,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Credentials and endpoint of the remote media host.
#[derive(Clone, Debug)]
pub struct RemoteHostConfig {
    pub api_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub timeout_secs: u64,
}

/// Full application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub uploads_dir: PathBuf,
    pub public_base_url: String,
    pub inline_max_bytes: usize,
    pub remote: Option<RemoteHostConfig>,
    // Upload configuration
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    // Thumbnail configuration
    pub thumbnails_enabled: bool,
    pub ffmpeg_path: String,
    pub thumbnail_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                metadata_store: MetadataStoreKind::Postgres,
                database_url: None,
                db_max_connections: MAX_CONNECTIONS,
                db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            },
            storage_backend: StorageBackend::Local,
            uploads_dir: PathBuf::from(UPLOADS_DIR),
            public_base_url: format!("http://localhost:{}", SERVER_PORT),
            inline_max_bytes: INLINE_MAX_SIZE_MB * 1024 * 1024,
            remote: None,
            max_upload_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            thumbnails_enabled: true,
            ffmpeg_path: "ffmpeg".to_string(),
            thumbnail_timeout_secs: THUMBNAIL_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = split_list(&cors_origins_str, false);

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let metadata_store = env::var("METADATA_STORE")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse::<MetadataStoreKind>()?;

        let base = BaseConfig {
            server_port,
            cors_origins,
            environment,
            metadata_store,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<StorageBackend>()?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", server_port))
            .trim_end_matches('/')
            .to_string();

        let max_upload_mb: usize = parse_or("MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB);
        let inline_max_mb: usize = parse_or("INLINE_MAX_SIZE_MB", INLINE_MAX_SIZE_MB);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .map(|s| split_list(&s, true))
            .unwrap_or_else(|_| {
                DEFAULT_ALLOWED_EXTENSIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        let remote = match (
            env::var("REMOTE_HOST_API_URL").ok(),
            env::var("REMOTE_HOST_API_KEY").ok(),
            env::var("REMOTE_HOST_API_SECRET").ok(),
        ) {
            (Some(api_url), Some(api_key), Some(api_secret))
                if !api_url.is_empty() && !api_key.is_empty() && !api_secret.is_empty() =>
            {
                Some(RemoteHostConfig {
                    api_url: api_url.trim_end_matches('/').to_string(),
                    api_key,
                    api_secret,
                    folder: env::var("REMOTE_HOST_FOLDER")
                        .unwrap_or_else(|_| REMOTE_HOST_FOLDER.to_string()),
                    timeout_secs: parse_or("REMOTE_HOST_TIMEOUT_SECS", REMOTE_HOST_TIMEOUT_SECS),
                })
            }
            _ => None,
        };

        Ok(AppConfig {
            base,
            storage_backend,
            uploads_dir: PathBuf::from(
                env::var("UPLOADS_DIR").unwrap_or_else(|_| UPLOADS_DIR.to_string()),
            ),
            public_base_url,
            inline_max_bytes: inline_max_mb * 1024 * 1024,
            remote,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            allowed_extensions,
            thumbnails_enabled: env::var("THUMBNAILS_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            thumbnail_timeout_secs: parse_or("THUMBNAIL_TIMEOUT_SECS", THUMBNAIL_TIMEOUT_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.metadata_store == MetadataStoreKind::Postgres {
            match self.base.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when METADATA_STORE=postgres"
                    ))
                }
                Some(url) if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                _ => {}
            }
        }

        if self.storage_backend == StorageBackend::Remote && self.remote.is_none() {
            return Err(anyhow::anyhow!(
                "REMOTE_HOST_API_URL, REMOTE_HOST_API_KEY and REMOTE_HOST_API_SECRET must be set when using the remote storage backend"
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS cannot be empty"));
        }

        if !(self.public_base_url.starts_with("http://")
            || self.public_base_url.starts_with("https://"))
        {
            return Err(anyhow::anyhow!(
                "PUBLIC_BASE_URL must start with http:// or https://"
            ));
        }

        Ok(())
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    pub fn new(config: AppConfig) -> Self {
        Config(Box::new(config))
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.0.validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.0.base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.0.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.0.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.0.base.environment
    }

    pub fn metadata_store(&self) -> MetadataStoreKind {
        self.0.base.metadata_store
    }

    pub fn database_url(&self) -> Option<&str> {
        self.0.base.database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.0.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.0.base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.0.storage_backend
    }

    pub fn uploads_dir(&self) -> &PathBuf {
        &self.0.uploads_dir
    }

    pub fn public_base_url(&self) -> &str {
        &self.0.public_base_url
    }

    pub fn inline_max_bytes(&self) -> usize {
        self.0.inline_max_bytes
    }

    pub fn remote(&self) -> Option<&RemoteHostConfig> {
        self.0.remote.as_ref()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.0.max_upload_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.0.allowed_extensions
    }

    pub fn thumbnails_enabled(&self) -> bool {
        self.0.thumbnails_enabled
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.0.ffmpeg_path
    }

    pub fn thumbnail_timeout_secs(&self) -> u64 {
        self.0.thumbnail_timeout_secs
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn split_list(value: &str, lowercase: bool) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            let s = s.trim_start_matches('.');
            if lowercase {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        })
        .collect()
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
