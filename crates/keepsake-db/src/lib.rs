//! Keepsake metadata store
//!
//! Album and media record persistence behind the [`AlbumStore`] and
//! [`MediaStore`] traits, with a Postgres implementation and an in-memory one
//! for tests and single-process deployments.

pub mod db;

pub use db::{AlbumStore, InMemoryStore, MediaStore, PgAlbumRepository, PgMediaRepository};
