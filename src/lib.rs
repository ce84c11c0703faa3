//! file-share - A small file-sharing API
//!
//! Clients upload base64-encoded content inline in a JSON body, list stored
//! files, and fetch time-limited download links. This crate provides:
//! - Swappable object storage backends (local filesystem, GCS)
//! - redb embedded database for file metadata
//! - REST API with a fixed route table and typed JSON errors

pub mod api;
pub mod config;
pub mod files;
pub mod object_store;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use object_store::{ObjectStore, UrlSigner};
use storage::MetadataStore;

/// Shared application state. Read-only after start-up.
pub struct AppState {
    pub config: Config,
    pub metadata: Arc<dyn MetadataStore>,
    pub object_store: Arc<dyn ObjectStore>,
    /// Present when blobs are served by this process (local backend).
    pub url_signer: Option<Arc<UrlSigner>>,
}
