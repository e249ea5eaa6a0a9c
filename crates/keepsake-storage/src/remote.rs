//! Remote media host adapter.
//!
//! The host exposes a signed-upload API:
//!
//! - `POST {api_url}/{image|video}/upload` (multipart) returns `{"secure_url": ...}`
//! - `POST {api_url}/{image|video}/destroy` (form) returns `{"result": "ok" | "not found"}`
//!
//! Requests carry `api_key`, `timestamp` and an HMAC-SHA256 `signature` over the
//! alphabetically sorted signed parameters. A stored video's URL with its
//! extension swapped for `.jpg` is a still frame of that video.

use crate::keys;
use crate::traits::{DeleteOutcome, Location, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use hmac::{Hmac, Mac};
use keepsake_core::media_kind::{extension_of, is_video_extension};
use keepsake_core::RemoteHostConfig;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Remote host storage implementation
#[derive(Clone)]
pub struct RemoteHostStorage {
    client: reqwest::Client,
    config: RemoteHostConfig,
}

impl RemoteHostStorage {
    pub fn new(config: RemoteHostConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(RemoteHostStorage { client, config })
    }

    fn sign(&self, params: &[(&str, &str)]) -> StorageResult<String> {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let payload = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut mac = HmacSha256::new_from_slice(self.config.api_secret.as_bytes())
            .map_err(|e| StorageError::ConfigError(format!("Invalid API secret: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
        resource_type: &str,
        folder: &str,
    ) -> StorageResult<String> {
        let public_id = filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(filename);
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("folder", folder),
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ])?;

        let size = data.len();
        let part = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("public_id", public_id.to_string())
            .text("folder", folder.to_string())
            .text("signature", signature)
            .part("file", part);

        let url = format!("{}/{}/upload", self.config.api_url, resource_type);
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Remote upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadFailed(format!(
                "Remote host returned {}: {}",
                status, body
            )));
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            StorageError::BackendError(format!("Invalid upload response from remote host: {}", e))
        })?;

        tracing::info!(
            url = %body.secure_url,
            resource_type = resource_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote host upload successful"
        );

        Ok(body.secure_url)
    }
}

#[async_trait]
impl Storage for RemoteHostStorage {
    async fn store(
        &self,
        data: Bytes,
        original_filename: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let filename = keys::generate_filename(original_filename);
        let resource_type = resource_type_for(&filename);
        let locator = self
            .upload(data, &filename, content_type, resource_type, &self.config.folder)
            .await?;

        Ok(StoredObject {
            filename: keys::filename_from_locator(&locator)
                .unwrap_or(&filename)
                .to_string(),
            locator,
            backend: StorageBackend::Remote,
            inline_data: None,
        })
    }

    async fn store_thumbnail(
        &self,
        primary: &StoredObject,
        jpeg: Bytes,
    ) -> StorageResult<StoredObject> {
        let filename = keys::thumbnail_filename(&primary.filename);
        let folder = format!("{}_thumbnails", self.config.folder);
        let locator = self
            .upload(jpeg, &filename, "image/jpeg", "image", &folder)
            .await?;

        Ok(StoredObject {
            locator,
            filename,
            backend: StorageBackend::Remote,
            inline_data: None,
        })
    }

    fn derived_thumbnail(&self, primary: &StoredObject) -> Option<String> {
        let ext = extension_of(&primary.filename)?;
        if !is_video_extension(&ext) {
            return None;
        }
        let (base, _) = primary.locator.rsplit_once('.')?;
        Some(format!("{}.jpg", base))
    }

    /// A derived thumbnail is a delivery transform of its video and shares
    /// the video's public id.
    fn same_object(&self, a: &str, b: &str) -> bool {
        match (parse_remote_locator(a), parse_remote_locator(b)) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        }
    }

    async fn locate(&self, locator: &str) -> StorageResult<Location> {
        Ok(Location::Redirect(locator.to_string()))
    }

    async fn delete(&self, locator: &str) -> StorageResult<DeleteOutcome> {
        let (resource_type, public_id) = parse_remote_locator(locator)
            .ok_or_else(|| StorageError::InvalidKey(format!("Not a remote locator: {}", locator)))?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ])?;

        let url = format!("{}/{}/destroy", self.config.api_url, resource_type);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("public_id", public_id.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("Remote destroy request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(StorageError::DeleteFailed(format!(
                "Remote host returned {} for {}",
                status, public_id
            )));
        }

        let body: DestroyResponse = response.json().await.map_err(|e| {
            StorageError::BackendError(format!("Invalid destroy response from remote host: {}", e))
        })?;

        match body.result.as_str() {
            "ok" => {
                tracing::info!(public_id = %public_id, "Remote host delete successful");
                Ok(DeleteOutcome::Deleted)
            }
            "not found" => Ok(DeleteOutcome::NotFound),
            other => Err(StorageError::DeleteFailed(format!(
                "Unexpected destroy result for {}: {}",
                public_id, other
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Remote
    }
}

fn resource_type_for(filename: &str) -> &'static str {
    match extension_of(filename) {
        Some(ext) if is_video_extension(&ext) => "video",
        _ => "image",
    }
}

/// Extract `(resource_type, public_id)` from a delivery URL of the form
/// `.../{resource_type}/upload/[v{version}/]{folder}/{name}.{ext}`.
fn parse_remote_locator(locator: &str) -> Option<(String, String)> {
    let path = locator.split(['?', '#']).next()?;
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let (resource_type, tail) = match segments.iter().position(|s| *s == "upload") {
        Some(idx) => {
            let resource_type = idx
                .checked_sub(1)
                .and_then(|i| segments.get(i))
                .filter(|s| **s == "image" || **s == "video")
                .map(|s| s.to_string());
            (resource_type, &segments[idx + 1..])
        }
        None => (None, &segments[segments.len().saturating_sub(1)..]),
    };

    let tail: Vec<&str> = match tail.first() {
        Some(first)
            if first.len() > 1
                && first.starts_with('v')
                && first[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            tail[1..].to_vec()
        }
        _ => tail.to_vec(),
    };

    let joined = tail.join("/");
    if joined.is_empty() {
        return None;
    }
    let public_id = joined
        .rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or(joined.clone());
    let resource_type = resource_type.unwrap_or_else(|| resource_type_for(&joined).to_string());

    Some((resource_type, public_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(api_url: String) -> RemoteHostConfig {
        RemoteHostConfig {
            api_url,
            api_key: "test-key".to_string(),
            api_secret: "test-secret".to_string(),
            folder: "wedding_photos".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn parses_delivery_urls() {
        assert_eq!(
            parse_remote_locator(
                "https://media.example.com/demo/video/upload/v1712/wedding_photos/abc.mp4"
            ),
            Some(("video".to_string(), "wedding_photos/abc".to_string()))
        );
        assert_eq!(
            parse_remote_locator("https://media.example.com/demo/image/upload/wedding_photos/x.jpg"),
            Some(("image".to_string(), "wedding_photos/x".to_string()))
        );
        assert_eq!(
            parse_remote_locator("https://cdn.example.com/files/clip.mov"),
            Some(("video".to_string(), "clip".to_string()))
        );
    }

    #[test]
    fn derived_thumbnail_is_the_same_object_as_its_video() {
        let storage = RemoteHostStorage::new(config("http://host".to_string())).unwrap();
        let video = "https://m.test/video/upload/v1/wedding_photos/abc.mp4";
        assert!(storage.same_object(video, "https://m.test/video/upload/v1/wedding_photos/abc.jpg"));
        assert!(!storage.same_object(
            video,
            "https://m.test/image/upload/v1/wedding_photos_thumbnails/thumb_abc.jpg"
        ));
        assert!(!storage.same_object(video, "https://m.test/video/upload/v1/wedding_photos/xyz.mp4"));
    }

    #[test]
    fn signature_is_order_independent() {
        let storage = RemoteHostStorage::new(config("http://host".to_string())).unwrap();
        let a = storage.sign(&[("timestamp", "1"), ("public_id", "p")]).unwrap();
        let b = storage.sign(&[("public_id", "p"), ("timestamp", "1")]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn derived_thumbnail_only_for_videos() {
        let storage = RemoteHostStorage::new(config("http://host".to_string())).unwrap();
        let video = StoredObject {
            locator: "https://m.test/video/upload/v1/wedding_photos/abc.mp4".to_string(),
            filename: "abc.mp4".to_string(),
            backend: StorageBackend::Remote,
            inline_data: None,
        };
        assert_eq!(
            storage.derived_thumbnail(&video).as_deref(),
            Some("https://m.test/video/upload/v1/wedding_photos/abc.jpg")
        );

        let image = StoredObject {
            filename: "abc.png".to_string(),
            ..video
        };
        assert!(storage.derived_thumbnail(&image).is_none());
    }

    #[tokio::test]
    async fn store_uploads_video_with_signed_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/video/upload")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"api_key\"".to_string()),
                Matcher::Regex("test-key".to_string()),
                Matcher::Regex("name=\"signature\"".to_string()),
                Matcher::Regex("wedding_photos".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"secure_url":"https://m.test/video/upload/v1/wedding_photos/abc.mp4"}"#,
            )
            .create_async()
            .await;

        let storage = RemoteHostStorage::new(config(server.url())).unwrap();
        let stored = storage
            .store(Bytes::from_static(b"video"), "Dance.MP4", "video/mp4")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(stored.backend, StorageBackend::Remote);
        assert_eq!(
            stored.locator,
            "https://m.test/video/upload/v1/wedding_photos/abc.mp4"
        );
        assert_eq!(stored.filename, "abc.mp4");
        assert_eq!(
            storage.locate(&stored.locator).await.unwrap(),
            Location::Redirect(stored.locator.clone())
        );
    }

    #[tokio::test]
    async fn store_surfaces_host_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/image/upload")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let storage = RemoteHostStorage::new(config(server.url())).unwrap();
        let result = storage
            .store(Bytes::from_static(b"img"), "a.jpg", "image/jpeg")
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn delete_maps_destroy_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/image/destroy")
            .match_body(Matcher::UrlEncoded(
                "public_id".to_string(),
                "wedding_photos/gone".to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"result":"not found"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/image/destroy")
            .match_body(Matcher::UrlEncoded(
                "public_id".to_string(),
                "wedding_photos/here".to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"result":"ok"}"#)
            .create_async()
            .await;

        let storage = RemoteHostStorage::new(config(server.url())).unwrap();
        assert_eq!(
            storage
                .delete("https://m.test/image/upload/v3/wedding_photos/gone.jpg")
                .await
                .unwrap(),
            DeleteOutcome::NotFound
        );
        assert_eq!(
            storage
                .delete("https://m.test/image/upload/v3/wedding_photos/here.jpg")
                .await
                .unwrap(),
            DeleteOutcome::Deleted
        );
    }
}
