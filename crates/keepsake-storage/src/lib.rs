//! Keepsake Storage Library
//!
//! Storage backend adapters for uploaded media. Three interchangeable backends
//! implement the [`Storage`] trait:
//!
//! - [`LocalStorage`]: files under the uploads directory, served from `/uploads/{filename}`
//! - [`InlineBlobStorage`]: bytes carried inside the media record, with a size
//!   ceiling above which it falls back to local disk
//! - [`RemoteHostStorage`]: a signed-upload HTTP media host returning absolute URLs
//!
//! # Filenames
//!
//! Stored filenames are 32 lowercase hex characters followed by the original
//! extension. Video thumbnails are named `thumb_{stem}.jpg`. Name generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod inline;
pub mod keys;
pub mod local;
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, StorageSet};
pub use inline::InlineBlobStorage;
pub use keepsake_core::StorageBackend;
pub use local::LocalStorage;
pub use remote::RemoteHostStorage;
pub use traits::{DeleteOutcome, Location, Storage, StorageError, StorageResult, StoredObject};
