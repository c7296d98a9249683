use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tokenbox::api::create_router;
use tokenbox::blob_store::LocalStore;
use tokenbox::config::Config;
use tokenbox::storage::Database;
use tokenbox::AppState;

const BOUNDARY: &str = "test-boundary";

fn test_config(temp_dir: &tempfile::TempDir, max_upload_size: u64) -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        data_dir: temp_dir.path().join("data").to_string_lossy().to_string(),
        uploads_dir: temp_dir
            .path()
            .join("uploads")
            .to_string_lossy()
            .to_string(),
        max_upload_size,
        public_base_url: None,
    }
}

fn build_app(config: Config) -> (Router, Arc<AppState>) {
    let db = Database::open(&config.data_dir).unwrap();
    let blob_store = LocalStore::new(&config.uploads_dir).unwrap();

    let state = Arc::new(AppState {
        config,
        db,
        blob_store: Arc::new(blob_store),
    });

    (create_router(Arc::clone(&state)), state)
}

fn multipart_body(filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/files")
        .header(header::HOST, "box.test")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(filename, content_type, data)))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, "box.test")
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn upload(app: &Router, filename: &str, content_type: &str, data: &[u8]) -> String {
    let response = app
        .clone()
        .oneshot(upload_request(filename, content_type, data))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["success"], true);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn upload_returns_token_and_shareable_url() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = build_app(test_config(&dir, 1024 * 1024));

    let response = app
        .oneshot(upload_request("report.txt", "text/plain", b"hello world"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["success"], true);

    let token = body["data"]["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert_eq!(
        body["data"]["file_url"].as_str().unwrap(),
        format!("http://box.test/file/{token}")
    );
}

#[tokio::test]
async fn upload_then_fetch_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = build_app(test_config(&dir, 1024 * 1024));

    let token = upload(&app, "report.txt", "text/plain", b"hello world").await;

    let response = app
        .oneshot(get_request(&format!("/files/{token}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let data = &body["data"];
    assert_eq!(data["id"], 1);
    assert_eq!(data["original_filename"], "report.txt");
    assert_eq!(data["filename"], format!("{token}_report.txt"));
    assert_eq!(data["file_size"], 11);
    assert_eq!(data["mime_type"], "text/plain");
    assert_eq!(data["upload_token"], token.as_str());
    assert!(!data["created_at"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn serve_streams_uploaded_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = build_app(test_config(&dir, 1024 * 1024));

    let token = upload(&app, "report.txt", "text/plain", b"hello world").await;

    let response = app
        .oneshot(get_request(&format!("/file/{token}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "inline; filename=\"report.txt\""
    );
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        "11"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"hello world");
}

#[tokio::test]
async fn unknown_token_returns_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = build_app(test_config(&dir, 1024 * 1024));

    for uri in ["/file/never-issued", "/files/never-issued"] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {uri}");
    }
}

#[tokio::test]
async fn stale_record_serves_not_found_but_keeps_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = build_app(test_config(&dir, 1024 * 1024));

    let token = upload(&app, "gone.txt", "text/plain", b"soon removed").await;

    // Remove the blob out-of-band; the record stays behind.
    let uploads = dir.path().join("uploads");
    let blob = std::fs::read_dir(&uploads).unwrap().next().unwrap().unwrap();
    std::fs::remove_file(blob.path()).unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/file/{token}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Metadata lookup still succeeds; the divergence is expected.
    let response = app
        .oneshot(get_request(&format!("/files/{token}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn stats_track_successful_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = build_app(test_config(&dir, 1024 * 1024));

    let response = app.clone().oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(json_body(response).await["data"]["total_files"], 0);

    upload(&app, "one.txt", "text/plain", b"1").await;
    let response = app.clone().oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(json_body(response).await["data"]["total_files"], 1);

    upload(&app, "two.txt", "text/plain", b"22").await;
    upload(&app, "three.txt", "text/plain", b"333").await;
    let response = app.oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(json_body(response).await["data"]["total_files"], 3);
}

#[tokio::test]
async fn upload_over_limit_is_rejected_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = build_app(test_config(&dir, 1024));

    let payload = vec![0u8; 1025];
    let response = app
        .oneshot(upload_request("big.bin", "application/octet-stream", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await["status"], "fail");

    // Neither store saw a write.
    let uploads = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(uploads, 0);
    assert_eq!(state.db.count_files().unwrap(), 0);
}

#[tokio::test]
async fn upload_at_exact_limit_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = build_app(test_config(&dir, 1024));

    let payload = vec![0u8; 1024];
    let token = upload(&app, "max.bin", "application/octet-stream", &payload).await;

    let record = state.db.get_file_by_token(&token).unwrap().unwrap();
    assert_eq!(record.file_size, 1024);
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = build_app(test_config(&dir, 1024 * 1024));

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/files")
        .header(header::HOST, "box.test")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_measures_size_from_payload() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = build_app(test_config(&dir, 1024 * 1024));

    let token = upload(&app, "sized.bin", "application/octet-stream", &[7u8; 321]).await;

    let record = state.db.get_file_by_token(&token).unwrap().unwrap();
    assert_eq!(record.file_size, 321);
}

#[tokio::test]
async fn file_url_uses_configured_public_base() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir, 1024 * 1024);
    config.public_base_url = Some("https://files.example.com".to_string());
    let (app, _state) = build_app(config);

    let response = app
        .oneshot(upload_request("report.txt", "text/plain", b"hi"))
        .await
        .unwrap();
    let body = json_body(response).await;

    let token = body["data"]["token"].as_str().unwrap();
    assert_eq!(
        body["data"]["file_url"].as_str().unwrap(),
        format!("https://files.example.com/file/{token}")
    );
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = build_app(test_config(&dir, 1024 * 1024));

    let response = app
        .oneshot(get_request("/_internal/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "ok");
    assert!(!body["data"]["timestamp"].as_str().unwrap().is_empty());
}
