//! Keepsake media processing
//!
//! Upload validation, video thumbnail extraction and the ingestion pipeline
//! that turns a multipart upload into stored bytes plus a media record.

pub mod upload;
pub mod validator;
pub mod video;

pub use upload::{MediaIngestionPipeline, UploadRequest, UploadedFile};
pub use validator::{MediaValidator, ValidationError};
pub use video::{FfmpegThumbnailer, ThumbnailError, ThumbnailGenerator};
