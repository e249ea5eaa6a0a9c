//! Photo upload, listing and deletion integration tests.
//!
//! Run with: `cargo test -p keepsake-api --test photos_test`

mod helpers;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::{upload_form, TINY_JPEG, TINY_MP4};
use helpers::{
    build_app, build_router, create_album, filename_of, setup_test_app, test_config,
    BrokenThumbnailer, FixedThumbnailer,
};
use keepsake_core::StorageBackend;
use keepsake_db::InMemoryStore;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn files_in(dir: &tempfile::TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[tokio::test]
async fn test_upload_list_get_delete_round_trip() {
    let (app, dir) = setup_test_app().await;
    let client = app.client();
    let album_id = create_album(client, "Round trip").await;

    let response = client
        .post(&format!("/api/albums/{}/photos", album_id))
        .multipart(upload_form("Cake.JPG", "image/jpeg", TINY_JPEG.to_vec()))
        .await;
    response.assert_status(StatusCode::CREATED);
    let record: Value = response.json();

    assert_eq!(record["albumId"], album_id.as_str());
    assert_eq!(record["title"], "First dance");
    assert_eq!(record["uploaderName"], "Aunt Selin");
    assert_eq!(record["originalFilename"], "Cake.JPG");
    assert_eq!(record["isVideo"], false);
    assert_eq!(record["mimeType"], "image/jpeg");
    assert_eq!(record["fileSize"], TINY_JPEG.len());
    assert_eq!(record["storageBackend"], "local");
    assert_eq!(record["isActive"], true);
    assert!(record["thumbnailLocator"].is_null());
    assert!(record.get("inlineData").is_none());

    let locator = record["primaryLocator"].as_str().unwrap();
    assert!(locator.starts_with("http://localhost:3001/uploads/"));
    assert!(locator.ends_with(".jpg"));
    let filename = filename_of(locator);
    assert!(dir.path().join(&filename).exists());

    let listed: Vec<Value> = client
        .get(&format!("/api/albums/{}/photos", album_id))
        .await
        .json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], record["id"]);

    let id = record["id"].as_str().unwrap();
    client
        .get(&format!("/api/photos/{}", id))
        .await
        .assert_status_ok();

    let served = client.get(&format!("/uploads/{}", filename)).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), TINY_JPEG);
    assert_eq!(served.header("content-type"), "image/jpeg");

    client
        .delete(&format!("/api/photos/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(!dir.path().join(&filename).exists());
    let gone = client.get(&format!("/api/photos/{}", id)).await;
    gone.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(gone.json::<Value>()["code"], "MEDIA_NOT_FOUND");

    client
        .delete(&format!("/api/photos/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    client
        .get(&format!("/uploads/{}", filename))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disallowed_extension_is_rejected_without_writes() {
    let (app, dir) = setup_test_app().await;
    let client = app.client();
    let album_id = create_album(client, "Exe").await;

    let response = client
        .post(&format!("/api/albums/{}/photos", album_id))
        .multipart(upload_form(
            "setup.exe",
            "application/octet-stream",
            b"MZ".to_vec(),
        ))
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.json::<Value>()["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert_eq!(app.store.media_count().await, 0);
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn test_oversize_upload_is_rejected_without_writes() {
    for backend in [StorageBackend::Local, StorageBackend::Inline] {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path(), backend);
        config.max_upload_bytes = 16;
        let app = build_app(config, InMemoryStore::new(), None).await;
        let album_id = create_album(app.client(), "Too big").await;

        let response = app
            .client()
            .post(&format!("/api/albums/{}/photos", album_id))
            .multipart(upload_form("big.jpg", "image/jpeg", vec![0u8; 64]))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(app.store.media_count().await, 0);
        assert_eq!(files_in(&dir), 0);
    }
}

/// Multipart body with a photo part of `size` zero bytes.
fn raw_upload_body(boundary: &str, size: usize) -> Vec<u8> {
    let mut body = Vec::with_capacity(size + 512);
    for (name, value) in [("title", "First dance"), ("uploaderName", "Aunt Selin")] {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"huge.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    body.resize(body.len() + size, 0);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[tokio::test]
async fn test_body_past_the_route_limit_gets_json_413() {
    const BOUNDARY: &str = "keepsake-test-boundary";
    // Ceiling of 16 bytes plus the 1 MiB multipart allowance is well under this.
    const BODY_FILE_BYTES: usize = 2 * 1024 * 1024;

    for chunked in [false, true] {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path(), StorageBackend::Local);
        config.max_upload_bytes = 16;
        let store = InMemoryStore::new();
        let app = build_app(config.clone(), store.clone(), None).await;
        let album_id = create_album(app.client(), "Way too big").await;
        let router = build_router(config, store.clone(), None).await;

        let payload = raw_upload_body(BOUNDARY, BODY_FILE_BYTES);
        let builder = Request::builder()
            .method("POST")
            .uri(format!("/api/albums/{}/photos", album_id))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        let request = if chunked {
            let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
                payload.chunks(64 * 1024).map(|c| Ok(c.to_vec())).collect();
            builder
                .body(Body::from_stream(futures::stream::iter(chunks)))
                .unwrap()
        } else {
            builder
                .header(header::CONTENT_LENGTH, payload.len())
                .body(Body::from(payload))
                .unwrap()
        };

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE, "chunked={}", chunked);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE", "chunked={}", chunked);
        assert_eq!(store.media_count().await, 0);
        assert_eq!(files_in(&dir), 0);
    }
}

#[tokio::test]
async fn test_unknown_album_writes_nothing() {
    let (app, dir) = setup_test_app().await;

    let response = app
        .client()
        .post(&format!("/api/albums/{}/photos", uuid::Uuid::new_v4()))
        .multipart(upload_form("cake.jpg", "image/jpeg", TINY_JPEG.to_vec()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "ALBUM_NOT_FOUND");
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn test_missing_fields_are_bad_requests() {
    let (app, _dir) = setup_test_app().await;
    let client = app.client();
    let album_id = create_album(client, "Missing").await;
    let path = format!("/api/albums/{}/photos", album_id);

    let no_file = MultipartForm::new()
        .add_text("title", "Toast")
        .add_text("uploaderName", "Best man");
    client
        .post(&path)
        .multipart(no_file)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let no_title = MultipartForm::new()
        .add_text("uploaderName", "Best man")
        .add_part(
            "photo",
            Part::bytes(TINY_JPEG.to_vec())
                .file_name("toast.jpg")
                .mime_type("image/jpeg"),
        );
    client
        .post(&path)
        .multipart(no_title)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(app.store.media_count().await, 0);
}

#[tokio::test]
async fn test_legacy_field_names_are_accepted() {
    let (app, _dir) = setup_test_app().await;
    let client = app.client();
    let album_id = create_album(client, "Legacy form").await;

    let form = MultipartForm::new()
        .add_text("title", "Bouquet")
        .add_text("name", "Florist")
        .add_part(
            "file",
            Part::bytes(TINY_JPEG.to_vec())
                .file_name("bouquet.jpeg")
                .mime_type("image/jpeg"),
        );
    let response = client
        .post(&format!("/api/albums/{}/photos", album_id))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["uploaderName"], "Florist");
}

#[tokio::test]
async fn test_video_gets_thumbnail_served_as_jpeg() {
    let (app, dir) = setup_test_app().await;
    let client = app.client();
    let album_id = create_album(client, "Video").await;

    let record: Value = client
        .post(&format!("/api/albums/{}/photos", album_id))
        .multipart(upload_form("dance.MP4", "video/mp4", TINY_MP4.to_vec()))
        .await
        .json();

    assert_eq!(record["isVideo"], true);
    let primary = filename_of(record["primaryLocator"].as_str().unwrap());
    let thumbnail = filename_of(record["thumbnailLocator"].as_str().unwrap());
    let stem = primary.trim_end_matches(".mp4");
    assert_eq!(thumbnail, format!("thumb_{}.jpg", stem));
    assert!(dir.path().join(&thumbnail).exists());

    let served = client.get(&format!("/uploads/{}", thumbnail)).await;
    served.assert_status_ok();
    assert_eq!(served.header("content-type"), "image/jpeg");
    assert_eq!(served.as_bytes().as_ref(), helpers::fixtures::TINY_JPEG);

    client
        .delete(&format!("/api/photos/{}", record["id"].as_str().unwrap()))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn test_video_without_thumbnail_still_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(
        test_config(dir.path(), StorageBackend::Local),
        InMemoryStore::new(),
        Some(Arc::new(BrokenThumbnailer)),
    )
    .await;
    let album_id = create_album(app.client(), "No ffmpeg").await;

    let response = app
        .client()
        .post(&format!("/api/albums/{}/photos", album_id))
        .multipart(upload_form("vows.webm", "video/webm", TINY_MP4.to_vec()))
        .await;

    response.assert_status(StatusCode::CREATED);
    let record: Value = response.json();
    assert_eq!(record["isVideo"], true);
    assert!(record["thumbnailLocator"].is_null());
    assert_eq!(files_in(&dir), 1);
}

#[tokio::test]
async fn test_inline_backend_keeps_small_files_in_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), StorageBackend::Inline);
    config.inline_max_bytes = 12;
    let app = build_app(config, InMemoryStore::new(), Some(Arc::new(FixedThumbnailer))).await;
    let client = app.client();
    let album_id = create_album(client, "Inline").await;
    let path = format!("/api/albums/{}/photos", album_id);

    let small: Value = client
        .post(&path)
        .multipart(upload_form("small.jpg", "image/jpeg", TINY_JPEG.to_vec()))
        .await
        .json();
    assert_eq!(small["storageBackend"], "inline");
    assert_eq!(files_in(&dir), 0);

    let served = client
        .get(&format!(
            "/uploads/{}",
            filename_of(small["primaryLocator"].as_str().unwrap())
        ))
        .await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), TINY_JPEG);

    let large: Value = client
        .post(&path)
        .multipart(upload_form("large.mp4", "video/mp4", TINY_MP4.to_vec()))
        .await
        .json();
    assert_eq!(large["storageBackend"], "local");
    assert!(files_in(&dir) >= 1);

    let listed: Vec<Value> = client.get(&path).await.json();
    assert_eq!(listed.len(), 2);
}
