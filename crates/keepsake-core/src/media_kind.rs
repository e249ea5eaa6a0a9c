//! Media classification by file extension.
//!
//! Uploads are classified purely by the extension of the client-supplied
//! filename. Content sniffing is not performed.

use std::path::Path;

/// Extensions accepted when `ALLOWED_EXTENSIONS` is not set.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "gif", "mp4", "webm", "ogg", "mov"];

/// Extensions treated as video.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mov"];

/// Lowercased extension of `filename` without the dot, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

pub fn is_video_extension(ext: &str) -> bool {
    let ext = ext.trim_start_matches('.').to_lowercase();
    VIDEO_EXTENSIONS.contains(&ext.as_str())
}

/// Canonical MIME type for an accepted extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// MIME type for a stored filename, used when streaming files back.
pub fn mime_for_filename(filename: &str) -> &'static str {
    extension_of(filename)
        .map(|ext| mime_for_extension(&ext))
        .unwrap_or("application/octet-stream")
}
