//! Upload fixtures: small byte blobs and multipart forms.

use axum_test::multipart::{MultipartForm, Part};

/// JPEG SOI/EOI markers; enough for anything that only sniffs the header.
pub const TINY_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0xFF, 0xD9];

/// `ftyp` box of an MP4 file.
pub const TINY_MP4: &[u8] = &[
    0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70, 0x69, 0x73, 0x6F, 0x6D, 0x00, 0x00, 0x02,
    0x00, 0x69, 0x73, 0x6F, 0x6D, 0x69, 0x73, 0x6F, 0x32,
];

pub fn upload_form(filename: &str, mime: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", "First dance")
        .add_text("uploaderName", "Aunt Selin")
        .add_part("photo", Part::bytes(data).file_name(filename).mime_type(mime))
}
