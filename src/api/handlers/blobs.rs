use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::{ApiError, AppPath, AppQuery};
use crate::files::{file_id_from_storage_key, DEFAULT_CONTENT_TYPE};
use crate::object_store::ObjectStoreError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BlobParams {
    pub expires: i64,
    pub signature: String,
}

/// Serve blob content for a signed download link, with the content type
/// recorded at upload.
/// Route: GET /blobs/*key (local backend only)
pub async fn serve_blob(
    State(state): State<Arc<AppState>>,
    AppPath(key): AppPath<String>,
    AppQuery(params): AppQuery<BlobParams>,
) -> Result<Response, ApiError> {
    let signer = state.url_signer.as_ref().ok_or_else(ApiError::route_not_found)?;

    // Expired and forged links look the same to the client
    if let Err(e) = signer.verify(&key, params.expires, &params.signature, chrono::Utc::now()) {
        tracing::debug!(key = %key, error = %e, "Rejected download link");
        return Err(ApiError::not_found("Download link is invalid or has expired"));
    }

    let file_id = file_id_from_storage_key(&key)
        .ok_or_else(|| ApiError::not_found("File content not found"))?;
    let record = state
        .metadata
        .get_record(file_id)
        .await
        .map_err(|e| {
            tracing::error!(file_id = %file_id, error = %e, "Failed to read file metadata");
            ApiError::store_unavailable("Failed to read file metadata")
        })?
        .ok_or_else(|| ApiError::not_found("File content not found"))?;

    let data = state.object_store.get(&key).await.map_err(|e| match e {
        ObjectStoreError::NotFound(_) | ObjectStoreError::InvalidKey(_) => {
            ApiError::not_found("File content not found")
        }
        _ => {
            tracing::error!(key = %key, error = %e, "Failed to read file content");
            ApiError::store_unavailable("Failed to read file content")
        }
    })?;

    let content_type = HeaderValue::from_str(&record.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, no-store"),
    );

    Ok(response)
}
