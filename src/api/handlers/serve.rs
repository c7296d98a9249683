use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use crate::api::response::ApiError;
use crate::AppState;

/// Serve file content by upload token.
/// Route: GET /file/:token
///
/// An unknown token and a record whose blob has vanished from disk produce
/// the same 404, so a caller cannot probe whether a token was ever issued.
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    // Look up file metadata by token
    let file = state
        .db
        .get_file_by_token(&token)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    // The record outlives the blob: open the path it points at and treat a
    // missing file as the same not-found as an unknown token.
    let blob = match tokio::fs::File::open(&file.file_path).await {
        Ok(blob) => blob,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(file_id = file.id, path = %file.file_path, "File record has no blob on disk");
            return Err(ApiError::not_found("File not found"));
        }
        Err(e) => return Err(ApiError::internal(format!("Failed to open file: {e}"))),
    };

    // Stream the blob rather than buffering it (uploads run to 200 MiB)
    let body = Body::from_stream(ReaderStream::new(blob));
    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        file.mime_type
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        header::HeaderValue::from(file.file_size),
    );

    // Suggest the client's original name for downloads
    if let Ok(value) = format!("inline; filename=\"{}\"", file.original_filename).parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    // Cache for 1 hour (blobs are immutable once uploaded)
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
