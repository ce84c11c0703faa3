use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one uploaded file. Written once at upload, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: String,
    /// Display name as supplied by the client; never used as a storage path.
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    /// Object store key, derived from `file_id`.
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}
