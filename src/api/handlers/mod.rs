mod blobs;
mod files;
mod health;

use crate::api::response::ApiError;

pub use blobs::serve_blob;
pub use files::{get_file, list_files, upload_file, FileDownloadResponse, FileResponse};
pub use health::{health, HealthResponse};

/// Fallback for any method and path outside the route table.
pub async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}
