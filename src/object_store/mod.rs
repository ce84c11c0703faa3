mod gcs;
mod local;
mod signing;

pub use gcs::GcsStore;
pub use local::LocalStore;
pub use signing::{SignatureError, UrlSigner};

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A time-limited reference to a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Abstraction over object storage backends.
/// Keys are derived from file ids -- the raw blobs are meaningless without the metadata store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), ObjectStoreError>;
    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError>;
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
    /// Produce a link that grants read access to `key` until it expires.
    async fn download_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<DownloadUrl, ObjectStoreError>;
}

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// As [`UNRESERVED`], but `/` is kept so object keys stay readable in URL paths.
const UNRESERVED_PATH: &AsciiSet = &UNRESERVED.remove(b'/');

/// Encode a single URL component (query value, object name in the JSON API).
pub(crate) fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED).to_string()
}

/// Encode an object key for use as a URL path.
pub(crate) fn encode_path(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED_PATH).to_string()
}
