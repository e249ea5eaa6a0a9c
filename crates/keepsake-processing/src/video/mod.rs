//! Video processing module

pub mod thumbnail;

pub use thumbnail::{FfmpegThumbnailer, ThumbnailError, ThumbnailGenerator};
