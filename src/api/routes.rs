use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

/// Room for the JSON envelope around the base64 payload.
const ENVELOPE_ALLOWANCE: u64 = 64 * 1024;

/// HTTP body limit for uploads: the base64 size of `max_upload_size` plus the envelope.
/// Saturates at `usize::MAX` rather than wrapping.
pub fn upload_body_limit(max_upload_size: u64) -> usize {
    let encoded = max_upload_size.div_ceil(3).saturating_mul(4);
    usize::try_from(encoded.saturating_add(ENVELOPE_ALLOWANCE)).unwrap_or(usize::MAX)
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = upload_body_limit(state.config.max_upload_size);

    // Unknown methods on known paths are RouteNotFound, same as unknown paths
    let mut router = Router::new()
        // Health
        .route("/", get(handlers::health).fallback(handlers::route_not_found))
        .route(
            "/health",
            get(handlers::health).fallback(handlers::route_not_found),
        )
        // Files
        .route(
            "/upload",
            post(handlers::upload_file)
                .layer(DefaultBodyLimit::max(body_limit))
                .fallback(handlers::route_not_found),
        )
        .route(
            "/files",
            get(handlers::list_files).fallback(handlers::route_not_found),
        )
        .route(
            "/files/:id",
            get(handlers::get_file).fallback(handlers::route_not_found),
        );

    // Signed download links for blobs held by this process
    if state.url_signer.is_some() {
        router = router.route(
            "/blobs/*key",
            get(handlers::serve_blob).fallback(handlers::route_not_found),
        );
    }

    router
        .fallback(handlers::route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
