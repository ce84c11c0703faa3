use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{new_file_id, storage_key, validate_upload, FileError};
use crate::storage::models::FileRecord;
use crate::AppState;

/// A file record together with a time-limited link to its content.
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub record: FileRecord,
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Validate, store the blob, then record its metadata.
///
/// The blob is written first so a metadata record never points at missing
/// content. If the metadata write fails the blob is removed on a best-effort
/// basis; a failed removal leaves an orphan that nothing references.
pub async fn upload_file(state: &AppState, body: &[u8]) -> Result<FileRecord, FileError> {
    let upload = validate_upload(body, state.config.max_upload_size)?;

    let file_id = new_file_id();
    let storage_key = storage_key(&file_id);
    let size_bytes = upload.content.len() as u64;

    // Phase 1: blob
    state
        .object_store
        .put(&storage_key, upload.content, &upload.content_type)
        .await
        .map_err(|e| {
            tracing::error!(file_id = %file_id, error = %e, "Failed to store file content");
            FileError::StoreUnavailable("Failed to store file content".to_string())
        })?;

    // Phase 2: metadata
    let record = FileRecord {
        file_id: file_id.clone(),
        file_name: upload.file_name,
        content_type: upload.content_type,
        size_bytes,
        storage_key: storage_key.clone(),
        created_at: Utc::now(),
    };

    if let Err(e) = state.metadata.put_record(&record).await {
        tracing::error!(file_id = %file_id, error = %e, "Failed to write file metadata");
        if let Err(e) = state.object_store.delete(&storage_key).await {
            tracing::warn!(file_id = %file_id, error = %e, "Failed to remove orphaned file content");
        }
        return Err(FileError::StoreUnavailable(
            "Failed to record file metadata".to_string(),
        ));
    }

    tracing::info!(file_id = %file_id, size_bytes, "Stored file");
    Ok(record)
}

pub async fn list_files(state: &AppState) -> Result<Vec<FileRecord>, FileError> {
    state.metadata.list_records().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list file metadata");
        FileError::StoreUnavailable("Failed to list files".to_string())
    })
}

pub async fn get_file(state: &AppState, file_id: &str) -> Result<FileDownload, FileError> {
    let record = state
        .metadata
        .get_record(file_id)
        .await
        .map_err(|e| {
            tracing::error!(file_id = %file_id, error = %e, "Failed to read file metadata");
            FileError::StoreUnavailable("Failed to read file metadata".to_string())
        })?
        .ok_or_else(|| FileError::NotFound(file_id.to_string()))?;

    let ttl = Duration::from_secs(state.config.storage.download_url_ttl_secs);
    let link = state
        .object_store
        .download_url(&record.storage_key, ttl)
        .await
        .map_err(|e| {
            tracing::error!(file_id = %file_id, error = %e, "Failed to create download link");
            FileError::StoreUnavailable("Failed to create download link".to_string())
        })?;

    tracing::debug!(file_id = %file_id, expires_at = %link.expires_at, "Issued download link");
    Ok(FileDownload {
        record,
        download_url: link.url,
        expires_at: link.expires_at,
    })
}
