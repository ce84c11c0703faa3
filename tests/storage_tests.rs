use chrono::{Duration, Utc};
use file_share::storage::models::FileRecord;
use file_share::storage::{Database, MetadataError, MetadataStore};

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data"), "files").unwrap();
    (dir, db)
}

fn sample_file(id: &str) -> FileRecord {
    FileRecord {
        file_id: id.to_string(),
        file_name: "Test File.png".to_string(),
        content_type: "image/png".to_string(),
        size_bytes: 1024,
        storage_key: format!("files/{id}"),
        created_at: Utc::now(),
    }
}

#[test]
fn test_insert_and_get_file() {
    let (_dir, db) = test_db();
    let file = sample_file("file-1");

    assert!(db.insert_file(&file).unwrap());

    let retrieved = db.get_file("file-1").unwrap().expect("file should exist");
    assert_eq!(retrieved, file);
}

#[test]
fn test_get_file_not_found() {
    let (_dir, db) = test_db();
    assert!(db.get_file("nonexistent").unwrap().is_none());
}

#[test]
fn test_insert_refuses_existing_id() {
    let (_dir, db) = test_db();
    let original = sample_file("file-2");
    assert!(db.insert_file(&original).unwrap());

    let mut replacement = sample_file("file-2");
    replacement.file_name = "other.png".to_string();
    assert!(!db.insert_file(&replacement).unwrap());

    let stored = db.get_file("file-2").unwrap().unwrap();
    assert_eq!(stored.file_name, "Test File.png");
}

#[test]
fn test_list_files_newest_first() {
    let (_dir, db) = test_db();
    let now = Utc::now();

    let mut old = sample_file("b-old");
    old.created_at = now - Duration::seconds(60);
    let mut new = sample_file("a-new");
    new.created_at = now;
    let mut middle = sample_file("c-middle");
    middle.created_at = now - Duration::seconds(30);

    for file in [&old, &new, &middle] {
        db.insert_file(file).unwrap();
    }

    let ids: Vec<String> = db
        .list_files()
        .unwrap()
        .into_iter()
        .map(|f| f.file_id)
        .collect();
    assert_eq!(ids, vec!["a-new", "c-middle", "b-old"]);
}

#[test]
fn test_list_files_empty() {
    let (_dir, db) = test_db();
    assert!(db.list_files().unwrap().is_empty());
}

#[test]
fn test_non_ascii_names_survive_storage() {
    let (_dir, db) = test_db();
    let mut file = sample_file("file-3");
    file.file_name = "résumé – 履歴書.pdf".to_string();
    db.insert_file(&file).unwrap();

    let stored = db.get_file("file-3").unwrap().unwrap();
    assert_eq!(stored.file_name, "résumé – 履歴書.pdf");
}

#[test]
fn test_records_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_file("file-4");
    {
        let db = Database::open(dir.path().join("data"), "files").unwrap();
        db.insert_file(&file).unwrap();
    }

    let db = Database::open(dir.path().join("data"), "files").unwrap();
    assert_eq!(db.get_file("file-4").unwrap(), Some(file));
}

#[test]
fn test_tables_are_separate() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = Database::open(dir.path().join("data"), "files").unwrap();
        db.insert_file(&sample_file("file-5")).unwrap();
    }

    let other = Database::open(dir.path().join("data"), "other-files").unwrap();
    assert!(other.get_file("file-5").unwrap().is_none());
    assert!(other.list_files().unwrap().is_empty());
}

#[tokio::test]
async fn test_metadata_store_put_conflict() {
    let (_dir, db) = test_db();
    let file = sample_file("file-6");

    db.put_record(&file).await.unwrap();
    let err = db.put_record(&file).await.unwrap_err();
    assert!(matches!(err, MetadataError::Conflict(id) if id == "file-6"));
}

#[tokio::test]
async fn test_metadata_store_get_and_list() {
    let (_dir, db) = test_db();
    for i in 0..3 {
        db.put_record(&sample_file(&format!("file-{i}"))).await.unwrap();
    }

    let records = db.list_records().await.unwrap();
    assert_eq!(records.len(), 3);
    for record in &records {
        let fetched = db.get_record(&record.file_id).await.unwrap();
        assert_eq!(fetched.as_ref(), Some(record));
    }
    assert!(db.get_record("missing").await.unwrap().is_none());
}
