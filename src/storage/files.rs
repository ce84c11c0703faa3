use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::FileRecord;

impl Database {
    // ========================================================================
    // File operations
    // ========================================================================

    /// Store a new file record. Returns false without writing if the id is taken.
    pub fn insert_file(&self, file: &FileRecord) -> Result<bool, DatabaseError> {
        debug_assert!(!file.file_id.is_empty(), "file id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(self.files_table())?;
            if table.get(file.file_id.as_str())?.is_some() {
                return Ok(false);
            }
            let data = rmp_serde::to_vec_named(file)?;
            table.insert(file.file_id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    /// Get a file by its id
    pub fn get_file(&self, id: &str) -> Result<Option<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(self.files_table())?;

        match table.get(id)? {
            Some(data) => {
                let file: FileRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(file))
            }
            None => Ok(None),
        }
    }

    /// All files, newest first
    pub fn list_files(&self) -> Result<Vec<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(self.files_table())?;

        let mut files = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let file: FileRecord = rmp_serde::from_slice(value.value())?;
            files.push(file);
        }

        files.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.file_id.cmp(&b.file_id))
        });
        Ok(files)
    }
}
