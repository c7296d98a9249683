use chrono::Utc;
use redb::{ReadableTable, ReadableTableMetadata};

use super::db::{Database, DatabaseError};
use super::models::{FileRecord, NewFileRecord};
use super::tables::*;

impl Database {
    // ========================================================================
    // File operations
    // ========================================================================

    /// Insert a new file record, assigning its id and creation timestamp.
    /// Fails with `TokenConflict` if the upload token is already indexed.
    pub fn insert_file(&self, new: NewFileRecord) -> Result<FileRecord, DatabaseError> {
        debug_assert!(
            !new.upload_token.is_empty(),
            "upload token must not be empty"
        );

        let write_txn = self.begin_write()?;
        let record = {
            let mut tokens = write_txn.open_table(FILE_TOKENS)?;
            if tokens.get(new.upload_token.as_str())?.is_some() {
                return Err(DatabaseError::TokenConflict(new.upload_token));
            }

            let mut files = write_txn.open_table(FILES)?;

            // Ids are monotonic: successor of the greatest id ever assigned.
            let id = files.last()?.map(|(k, _)| k.value() + 1).unwrap_or(1);

            let record = FileRecord {
                id,
                filename: new.filename,
                original_filename: new.original_filename,
                file_path: new.file_path,
                file_size: new.file_size,
                mime_type: new.mime_type,
                upload_token: new.upload_token,
                created_at: Utc::now(),
            };

            let data = rmp_serde::to_vec_named(&record)?;
            files.insert(record.id, data.as_slice())?;
            tokens.insert(record.upload_token.as_str(), record.id)?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// Get a file by its upload token (resolves token -> id -> record)
    pub fn get_file_by_token(&self, token: &str) -> Result<Option<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let tokens = read_txn.open_table(FILE_TOKENS)?;

        let id = match tokens.get(token)? {
            Some(value) => value.value(),
            None => return Ok(None),
        };

        let files = read_txn.open_table(FILES)?;
        match files.get(id)? {
            Some(data) => {
                let record: FileRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Total number of file records. Records are never deleted, so this
    /// equals the number of successful inserts to date.
    pub fn count_files(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let files = read_txn.open_table(FILES)?;
        Ok(files.len()?)
    }
}
