use bytes::Bytes;
use uuid::Uuid;

/// File part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Raw upload as received; fields are validated by the pipeline.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub album_id: Uuid,
    pub title: Option<String>,
    pub uploader_name: Option<String>,
    pub file: Option<UploadedFile>,
}
