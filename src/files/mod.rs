//! File-sharing operations: upload, list and get-by-id over the blob and metadata stores.

mod operations;
pub mod validate;

pub use operations::{get_file, list_files, upload_file, FileDownload};
pub use validate::{validate_upload, ValidatedUpload, ValidationError, DEFAULT_CONTENT_TYPE};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("File not found: {0}")]
    NotFound(String),
    /// A store call failed. The message is safe to show clients; the cause is logged.
    #[error("{0}")]
    StoreUnavailable(String),
}

/// A fresh random (v4) file id, independent of file name and content.
pub fn new_file_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

const STORAGE_KEY_PREFIX: &str = "files/";

/// Object store key for a file id.
pub fn storage_key(file_id: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{file_id}")
}

/// Inverse of [`storage_key`]. `None` for keys that do not belong to a file.
pub fn file_id_from_storage_key(key: &str) -> Option<&str> {
    key.strip_prefix(STORAGE_KEY_PREFIX)
        .filter(|id| !id.is_empty() && !id.contains('/'))
}
