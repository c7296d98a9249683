use std::sync::Arc;

use axum::extract::{Host, Multipart, Path, State};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;

use crate::api::response::{ApiError, JSend};
use crate::config::Config;
use crate::storage::models::{FileRecord, NewFileRecord};
use crate::storage::DatabaseError;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub token: String,
    pub file_url: String,
}

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: u64,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: String,
    pub upload_token: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct FileStatsResponse {
    pub total_files: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    mut multipart: Multipart,
) -> Result<Json<JSend<UploadResponse>>, ApiError> {
    let mut file_data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;
    let mut file_content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                file_content_type = field.content_type().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

                // The size on record is measured from the payload, never
                // taken from a client-declared field.
                if data.len() as u64 > state.config.max_upload_size {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds maximum upload size of {} bytes",
                        state.config.max_upload_size
                    )));
                }

                file_data = Some(data);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let file_data = file_data.ok_or_else(|| ApiError::bad_request("file field is required"))?;

    let original_filename = sanitize_filename(file_name.as_deref());

    // Determine MIME type: from multipart Content-Type, or guess from the
    // filename, or fallback
    let mime_type = file_content_type
        .filter(|ct| ct != "application/octet-stream")
        .or_else(|| {
            mime_guess::from_path(&original_filename)
                .first()
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let token = uuid::Uuid::new_v4().to_string();
    let filename = format!("{token}_{original_filename}");
    let file_size = file_data.len() as u64;

    // Phase 1: write the blob. A failed write inserts nothing.
    let file_path = state
        .blob_store
        .put(&filename, file_data)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?;

    // Phase 2: insert the metadata record.
    let new_record = NewFileRecord {
        filename: filename.clone(),
        original_filename,
        file_path: file_path.to_string_lossy().into_owned(),
        file_size,
        mime_type,
        upload_token: token,
    };

    let record = match state.db.insert_file(new_record) {
        Ok(record) => record,
        Err(e) => {
            // Best-effort cleanup of the already-written blob
            if let Err(del) = state.blob_store.delete(&filename).await {
                tracing::warn!(filename = %filename, error = %del, "Failed to remove orphaned blob");
            }
            return Err(match e {
                DatabaseError::TokenConflict(token) => {
                    ApiError::conflict(format!("upload token '{token}' is already in use"))
                }
                other => ApiError::internal(other.to_string()),
            });
        }
    };

    let file_url = file_url(&state.config, &host, &record.upload_token);
    tracing::debug!(file_id = record.id, token = %record.upload_token, "Uploaded file");

    Ok(JSend::success(UploadResponse {
        success: true,
        token: record.upload_token,
        file_url,
    }))
}

pub async fn get_file_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<JSend<FileResponse>>, ApiError> {
    let file = state
        .db
        .get_file_by_token(&token)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    Ok(JSend::success(file_to_response(&file)))
}

pub async fn file_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<FileStatsResponse>>, ApiError> {
    let total_files = state
        .db
        .count_files()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(JSend::success(FileStatsResponse { total_files }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Shareable download URL for a token: the configured public base when set,
/// otherwise the host the request came in on.
fn file_url(config: &Config, host: &str, token: &str) -> String {
    match &config.public_base_url {
        Some(base) => format!("{}/file/{token}", base.trim_end_matches('/')),
        None => format!("http://{host}/file/{token}"),
    }
}

/// Reduce a client-supplied filename to its final path component.
fn sanitize_filename(name: Option<&str>) -> String {
    let name = name.unwrap_or("").trim();
    let last = name.rsplit(['/', '\\']).next().unwrap_or("");
    if last.is_empty() || last == "." || last == ".." {
        "file.bin".to_string()
    } else {
        last.to_string()
    }
}

fn file_to_response(file: &FileRecord) -> FileResponse {
    FileResponse {
        id: file.id,
        filename: file.filename.clone(),
        original_filename: file.original_filename.clone(),
        file_path: file.file_path.clone(),
        file_size: file.file_size,
        mime_type: file.mime_type.clone(),
        upload_token: file.upload_token.clone(),
        created_at: file.created_at.to_rfc3339(),
    }
}
