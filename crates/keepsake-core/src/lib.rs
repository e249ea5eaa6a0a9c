//! Keepsake Core Library
//!
//! Domain models, error types, configuration and media classification shared by
//! every Keepsake crate.

pub mod config;
pub mod error;
pub mod media_kind;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AppConfig, Config, MetadataStoreKind, RemoteHostConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
