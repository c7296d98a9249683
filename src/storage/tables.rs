use redb::TableDefinition;

/// File records: id -> FileRecord (msgpack)
pub const FILES: TableDefinition<u64, &[u8]> = TableDefinition::new("files");

/// Token index: upload_token -> file id (uniqueness constraint + lookups)
pub const FILE_TOKENS: TableDefinition<&str, u64> = TableDefinition::new("file_tokens");
