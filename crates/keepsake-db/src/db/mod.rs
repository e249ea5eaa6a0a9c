//! Database repositories for data access layer
//
// Store traits shared by every backend
pub mod traits;
//
// Postgres repositories
pub mod album;
pub mod media;
//
// Process-local store
pub mod memory;

pub use album::PgAlbumRepository;
pub use media::PgMediaRepository;
pub use memory::InMemoryStore;
pub use traits::{AlbumStore, MediaStore};
