mod handlers;
pub mod response;
mod routes;

pub use handlers::{FileDownloadResponse, FileResponse, HealthResponse};
pub use routes::{create_router, upload_body_limit};
