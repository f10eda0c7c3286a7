// SPDX-License-Identifier: MPL-2.0

//! Upload and gallery requests against an in-process media server

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
};
use camera_upload::backends::camera::CameraFrame;
use camera_upload::config::ServerConfig;
use camera_upload::delivery::upload_or_keep;
use camera_upload::errors::ServerError;
use camera_upload::pipelines::photo::PhotoPipeline;
use camera_upload::{GalleryClient, MediaFile, MediaKind, UploadClient, UploadResponse};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// One multipart part as the server saw it
#[derive(Debug, Clone)]
struct ReceivedPart {
    endpoint: &'static str,
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

type PartLog = Arc<Mutex<Vec<ReceivedPart>>>;

async fn record_parts(endpoint: &'static str, log: &PartLog, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let part = ReceivedPart {
            endpoint,
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: field.bytes().await.unwrap().to_vec(),
        };
        log.lock().unwrap().push(part);
    }
}

async fn upload_photo(State(log): State<PartLog>, multipart: Multipart) -> Json<Value> {
    record_parts("/upload", &log, multipart).await;
    Json(json!({ "path": "/uploads/photo-1.jpg" }))
}

async fn upload_video(State(log): State<PartLog>, multipart: Multipart) -> &'static str {
    record_parts("/upload-video", &log, multipart).await;
    "stored"
}

async fn list_photos() -> Json<Vec<&'static str>> {
    Json(vec!["/uploads/a.jpg", "uploads/b.png"])
}

async fn list_videos() -> Json<Vec<&'static str>> {
    Json(vec!["uploads/videos/1700000000.webm"])
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn media_server() -> (String, PartLog) {
    let log = PartLog::default();
    let router = Router::new()
        .route("/upload", post(upload_photo))
        .route("/upload-video", post(upload_video))
        .route("/photos", get(list_photos))
        .route("/videos", get(list_videos))
        .with_state(Arc::clone(&log));
    (serve(router).await, log)
}

async fn failing_server() -> String {
    let router = Router::new()
        .route(
            "/upload-video",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route("/photos", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/videos", get(|| async { "not a listing" }));
    serve(router).await
}

fn server(base_url: &str) -> ServerConfig {
    ServerConfig::new(base_url, Duration::from_secs(5))
}

#[tokio::test]
async fn test_video_upload_sends_single_webm_part() {
    let (base_url, log) = media_server().await;
    let client = UploadClient::new(&server(&base_url)).unwrap();

    let blob = b"\x1a\x45\xdf\xa3webm-cluster-data".to_vec();
    let response = client
        .upload_video(MediaFile::new(blob.clone(), "video.webm", "video/webm"))
        .await
        .unwrap();
    assert_eq!(response, UploadResponse::Text("stored".to_string()));

    let parts = log.lock().unwrap().clone();
    assert_eq!(parts.len(), 1);
    let part = &parts[0];
    assert_eq!(part.endpoint, "/upload-video");
    assert_eq!(part.field, "video");
    assert_eq!(part.file_name.as_deref(), Some("video.webm"));
    assert_eq!(part.content_type.as_deref(), Some("video/webm"));
    assert_eq!(part.bytes, blob);
}

#[tokio::test]
async fn test_photo_capture_and_upload() {
    let (base_url, log) = media_server().await;
    let client = UploadClient::new(&server(&base_url)).unwrap();

    let frame = CameraFrame::from_rgba(16, 12, vec![128; 16 * 12 * 4]);
    let photo = PhotoPipeline::default().capture(Some(&frame)).await.unwrap();
    let response = client.upload_photo(photo).await.unwrap();
    assert_eq!(
        response,
        UploadResponse::Json(json!({ "path": "/uploads/photo-1.jpg" }))
    );

    let parts = log.lock().unwrap().clone();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].endpoint, "/upload");
    assert_eq!(parts[0].field, "photo");
    assert_eq!(parts[0].file_name.as_deref(), Some("photo.jpg"));
    assert_eq!(parts[0].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(&parts[0].bytes[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let (base_url, log) = media_server().await;
    let client = UploadClient::new(&server(&format!("{}/", base_url))).unwrap();

    client
        .upload_video(MediaFile::new(vec![1, 2, 3], "video.webm", "video/webm"))
        .await
        .unwrap();
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_rejected_status() {
    let base_url = failing_server().await;
    let client = UploadClient::new(&server(&base_url)).unwrap();

    let err = client
        .upload_video(MediaFile::new(vec![1], "video.webm", "video/webm"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ServerError::Status {
            status: 500,
            endpoint: "/upload-video".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = UploadClient::new(&server(&format!("http://{}", addr))).unwrap();
    let err = client
        .upload_photo(MediaFile::new(vec![1], "photo.jpg", "image/jpeg"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn test_failed_video_upload_is_kept_locally() {
    let base_url = failing_server().await;
    let client = UploadClient::new(&server(&base_url)).unwrap();
    let keep_dir = tempfile::tempdir().unwrap();

    let blob = b"\x1a\x45\xdf\xa3recording".to_vec();
    let failure = upload_or_keep(
        &client,
        MediaKind::Video,
        MediaFile::new(blob.clone(), "video.webm", "video/webm"),
        keep_dir.path(),
    )
    .await
    .unwrap_err();

    assert_eq!(
        failure.error,
        ServerError::Status {
            status: 500,
            endpoint: "/upload-video".to_string()
        }
    );
    let kept = failure.kept.unwrap().unwrap();
    assert_eq!(kept.parent(), Some(keep_dir.path()));
    assert_eq!(kept.extension().unwrap(), "webm");
    assert_eq!(std::fs::read(&kept).unwrap(), blob);
}

#[tokio::test]
async fn test_failed_photo_upload_is_not_kept() {
    let base_url = failing_server().await;
    let client = UploadClient::new(&server(&base_url)).unwrap();
    let keep_dir = tempfile::tempdir().unwrap();

    let failure = upload_or_keep(
        &client,
        MediaKind::Photo,
        MediaFile::new(vec![0xFF, 0xD8], "photo.jpg", "image/jpeg"),
        keep_dir.path(),
    )
    .await
    .unwrap_err();

    assert!(matches!(failure.error, ServerError::Status { status: 404, .. }));
    assert!(failure.kept.is_none());
    assert_eq!(std::fs::read_dir(keep_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_uploaded_video_is_not_written() {
    let (base_url, log) = media_server().await;
    let client = UploadClient::new(&server(&base_url)).unwrap();
    let keep_dir = tempfile::tempdir().unwrap();

    upload_or_keep(
        &client,
        MediaKind::Video,
        MediaFile::new(vec![1, 2], "video.webm", "video/webm"),
        keep_dir.path(),
    )
    .await
    .unwrap();

    assert_eq!(log.lock().unwrap().len(), 1);
    assert_eq!(std::fs::read_dir(keep_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_invalid_base_url() {
    let err = UploadClient::new(&server("not a url")).unwrap_err();
    assert!(matches!(err, ServerError::InvalidUrl(_)));
}

#[tokio::test]
async fn test_gallery_listings_resolve_media_urls() {
    let (base_url, _) = media_server().await;
    let client = GalleryClient::new(&server(&base_url)).unwrap();

    let photos = client.photos().await.unwrap();
    let urls: Vec<&str> = photos.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/uploads/a.jpg", base_url),
            format!("{}/uploads/b.png", base_url)
        ]
    );

    let videos = client.videos().await.unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].name(), "1700000000.webm");
    assert_eq!(
        videos[0].url,
        format!("{}/video/1700000000.webm", base_url)
    );
}

#[tokio::test]
async fn test_gallery_errors() {
    let base_url = failing_server().await;
    let client = GalleryClient::new(&server(&base_url)).unwrap();

    assert_eq!(
        client.photos().await.unwrap_err(),
        ServerError::Status {
            status: 503,
            endpoint: "/photos".to_string()
        }
    );
    assert!(matches!(
        client.videos().await.unwrap_err(),
        ServerError::InvalidResponse(_)
    ));
}
