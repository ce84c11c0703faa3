use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppBody, AppPath, AppQuery};
use crate::files::{self, FileDownload};
use crate::storage::models::FileRecord;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// Client view of a FileRecord; the storage key stays internal.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub file_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileDownloadResponse {
    #[serde(flatten)]
    pub file: FileResponse,
    pub download_url: String,
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesParams {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AppBody(body): AppBody,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let record = files::upload_file(&state, &body).await?;
    Ok((StatusCode::CREATED, Json(file_to_response(&record))))
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListFilesParams>,
) -> Result<Json<Vec<FileResponse>>, ApiError> {
    if params.limit == Some(0) {
        return Err(ApiError::malformed("limit must be greater than 0"));
    }

    let records = files::list_files(&state).await?;
    let items = records
        .iter()
        .skip(params.offset as usize)
        .take(params.limit.map_or(usize::MAX, |l| l as usize))
        .map(file_to_response)
        .collect();

    Ok(Json(items))
}

pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> Result<Json<FileDownloadResponse>, ApiError> {
    let download = files::get_file(&state, &id).await?;
    Ok(Json(download_to_response(&download)))
}

// ============================================================================
// Helpers
// ============================================================================

fn file_to_response(file: &FileRecord) -> FileResponse {
    FileResponse {
        file_id: file.file_id.clone(),
        file_name: file.file_name.clone(),
        content_type: file.content_type.clone(),
        size_bytes: file.size_bytes,
        created_at: file.created_at.to_rfc3339(),
    }
}

fn download_to_response(download: &FileDownload) -> FileDownloadResponse {
    FileDownloadResponse {
        file: file_to_response(&download.record),
        download_url: download.download_url.clone(),
        expires_at: download.expires_at.to_rfc3339(),
    }
}
