pub mod db;
mod files;
pub mod models;

pub use db::{Database, DatabaseError};

use async_trait::async_trait;
use thiserror::Error;

use models::FileRecord;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Record already exists: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Abstraction over metadata backends holding file records keyed by file id.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Store a new record; an existing id is a `Conflict`, never an overwrite.
    async fn put_record(&self, record: &FileRecord) -> Result<(), MetadataError>;
    async fn get_record(&self, file_id: &str) -> Result<Option<FileRecord>, MetadataError>;
    async fn list_records(&self) -> Result<Vec<FileRecord>, MetadataError>;
}

#[async_trait]
impl MetadataStore for Database {
    async fn put_record(&self, record: &FileRecord) -> Result<(), MetadataError> {
        if !self.insert_file(record)? {
            return Err(MetadataError::Conflict(record.file_id.clone()));
        }
        Ok(())
    }

    async fn get_record(&self, file_id: &str) -> Result<Option<FileRecord>, MetadataError> {
        Ok(self.get_file(file_id)?)
    }

    async fn list_records(&self) -> Result<Vec<FileRecord>, MetadataError> {
        Ok(self.list_files()?)
    }
}
