//! Media ingestion: validate, store bytes, thumbnail videos, write the record.

pub mod pipeline;
pub mod types;

pub use pipeline::MediaIngestionPipeline;
pub use types::{UploadRequest, UploadedFile};
