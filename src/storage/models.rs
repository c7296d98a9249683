use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file record stored in redb. Records are write-once: nothing updates
/// or deletes them after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: u64,
    /// Generated storage-facing name: `{token}_{original_filename}`
    pub filename: String,
    /// Name supplied by the uploading client; display-only, untrusted
    pub original_filename: String,
    /// Location of the blob on disk
    pub file_path: String,
    /// Byte length measured from the payload actually written
    pub file_size: u64,
    /// Client-declared content type, untrusted
    pub mime_type: String,
    /// Opaque unique token; the sole credential needed to read the file
    pub upload_token: String,
    pub created_at: DateTime<Utc>,
}

/// Insert input. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: String,
    pub upload_token: String,
}
