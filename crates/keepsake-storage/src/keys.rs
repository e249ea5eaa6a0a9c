//! Shared filename generation and locator parsing for storage backends.

use keepsake_core::media_kind::extension_of;

/// URL path segment under which local and inline files are served.
pub const UPLOADS_ROUTE: &str = "uploads";

/// Prefix marking a thumbnail filename.
pub const THUMBNAIL_PREFIX: &str = "thumb_";

/// Generate a collision-resistant filename: 128 random bits as hex plus the
/// lowercased original extension.
pub fn generate_filename(original_filename: &str) -> String {
    let id: [u8; 16] = rand::random();
    match extension_of(original_filename) {
        Some(ext) => format!("{}.{}", hex::encode(id), ext),
        None => hex::encode(id),
    }
}

/// Thumbnail filename for a stored primary: `thumb_{stem}.jpg`.
pub fn thumbnail_filename(primary_filename: &str) -> String {
    let stem = primary_filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(primary_filename);
    format!("{}{}.jpg", THUMBNAIL_PREFIX, stem)
}

/// Last path segment of a locator, ignoring any query string or fragment.
pub fn filename_from_locator(locator: &str) -> Option<&str> {
    let without_query = locator
        .split(['?', '#'])
        .next()
        .unwrap_or(locator);
    without_query
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Public URL for a locally served file.
pub fn public_url(public_base_url: &str, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        public_base_url.trim_end_matches('/'),
        UPLOADS_ROUTE,
        filename
    )
}

/// A bare filename is safe to join onto the uploads directory.
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains('\0')
}

/// Whether the filename names a thumbnail.
pub fn is_thumbnail_filename(filename: &str) -> bool {
    filename.starts_with(THUMBNAIL_PREFIX)
}
