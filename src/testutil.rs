//! Shared test helpers for file-share tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{Config, MetadataConfig, ServerConfig, StorageConfig};
use crate::object_store::{DownloadUrl, LocalStore, ObjectStore, ObjectStoreError, UrlSigner};
use crate::storage::models::FileRecord;
use crate::storage::{Database, MetadataError, MetadataStore};
use crate::AppState;

pub const TEST_BASE_URL: &str = "http://files.test";

/// Configuration rooted in a temporary directory.
pub fn test_config(temp_dir: &tempfile::TempDir) -> Config {
    Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            public_base_url: TEST_BASE_URL.to_string(),
        },
        storage: StorageConfig {
            local_storage_path: temp_dir.path().join("files").to_string_lossy().to_string(),
            signing_secret: Some("test-secret".to_string()),
            ..Default::default()
        },
        metadata: MetadataConfig {
            data_dir: temp_dir.path().join("data").to_string_lossy().to_string(),
            table_name: "files".to_string(),
        },
        max_upload_size: 20 * 1024 * 1024,
    }
}

/// Create a test AppState with a temporary database and local object store.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    test_state_with_config(test_config(temp_dir))
}

pub fn test_state_with_config(config: Config) -> Arc<AppState> {
    let db = Database::open(&config.metadata.data_dir, &config.metadata.table_name)
        .expect("Failed to open test database");
    let (object_store, signer) = local_store(&config);

    Arc::new(AppState {
        config,
        metadata: Arc::new(db),
        object_store,
        url_signer: Some(signer),
    })
}

/// A test AppState with caller-provided stores.
pub fn test_state_with_stores(
    temp_dir: &tempfile::TempDir,
    metadata: Arc<dyn MetadataStore>,
    object_store: Arc<dyn ObjectStore>,
) -> Arc<AppState> {
    let config = test_config(temp_dir);
    let (_, signer) = local_store(&config);
    Arc::new(AppState {
        config,
        metadata,
        object_store,
        url_signer: Some(signer),
    })
}

pub fn local_store(config: &Config) -> (Arc<LocalStore>, Arc<UrlSigner>) {
    let secret = config.storage.signing_secret.as_deref().unwrap_or_default();
    let signer = Arc::new(UrlSigner::new(&config.server.public_base_url, secret.as_bytes()));
    let store = LocalStore::new(&config.storage.local_storage_path, Arc::clone(&signer))
        .expect("Failed to create test object store");
    (Arc::new(store), signer)
}

/// Object store whose every call fails.
pub struct FailingObjectStore;

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn put(&self, _key: &str, _data: Bytes, _content_type: &str) -> Result<(), ObjectStoreError> {
        Err(unavailable())
    }

    async fn get(&self, _key: &str) -> Result<Bytes, ObjectStoreError> {
        Err(unavailable())
    }

    async fn delete(&self, _key: &str) -> Result<(), ObjectStoreError> {
        Err(unavailable())
    }

    async fn download_url(
        &self,
        _key: &str,
        _expires_in: Duration,
    ) -> Result<DownloadUrl, ObjectStoreError> {
        Err(unavailable())
    }
}

fn unavailable() -> ObjectStoreError {
    ObjectStoreError::Backend("bucket secret-bucket-7 unreachable".to_string())
}

/// Metadata store whose every call fails.
pub struct FailingMetadataStore;

#[async_trait]
impl MetadataStore for FailingMetadataStore {
    async fn put_record(&self, _record: &FileRecord) -> Result<(), MetadataError> {
        Err(MetadataError::Backend("table secret-table-7 unreachable".to_string()))
    }

    async fn get_record(&self, _file_id: &str) -> Result<Option<FileRecord>, MetadataError> {
        Err(MetadataError::Backend("table secret-table-7 unreachable".to_string()))
    }

    async fn list_records(&self) -> Result<Vec<FileRecord>, MetadataError> {
        Err(MetadataError::Backend("table secret-table-7 unreachable".to_string()))
    }
}
