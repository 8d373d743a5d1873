use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use roster_core::storage::{JsonFileStore, RecordStore, RecordType};
use roster_core::RosterError;

struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be available")
            .as_nanos();
        let filename = format!("{}_{}_{}.json", prefix, std::process::id(), nanos);
        let path = std::env::temp_dir().join(filename);
        Self { path }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[test]
fn test_ids_are_not_reused_after_interior_delete() {
    let temp = TempFile::new("roster_store_ids");
    let store = JsonFileStore::open(&temp.path).expect("open should succeed");

    let a = store.add_record("a", RecordType::Student, "A").expect("add A");
    let b = store.add_record("b", RecordType::Teacher, "B").expect("add B");
    let c = store.add_record("c", RecordType::Parent, "C").expect("add C");
    assert_eq!((a, b, c), (1, 2, 3));

    assert!(store.delete_by_id(b).expect("delete should succeed"));
    let d = store.add_record("d", RecordType::Student, "D").expect("add D");
    assert_eq!(d, 4);

    let ids: Vec<u64> = store
        .get_all()
        .expect("get_all should succeed")
        .iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);
}

#[test]
fn test_delete_missing_id_leaves_table_unchanged() {
    let temp = TempFile::new("roster_store_delete_missing");
    let store = JsonFileStore::open(&temp.path).expect("open should succeed");
    store.add_record("a", RecordType::Student, "A").expect("add");

    let before = fs::read(&temp.path).expect("read should succeed");
    assert!(!store.delete_by_id(42).expect("delete should succeed"));
    let after = fs::read(&temp.path).expect("read should succeed");

    assert_eq!(before, after);
}

#[test]
fn test_update_missing_id_is_not_found() {
    let temp = TempFile::new("roster_store_update_missing");
    let store = JsonFileStore::open(&temp.path).expect("open should succeed");

    let result = store.update_by_id(7, "cipher", "nobody");
    assert!(matches!(result, Err(RosterError::NotFound(_))));
    assert!(store.get_all().expect("get_all should succeed").is_empty());
}

#[test]
fn test_records_survive_reopen() {
    let temp = TempFile::new("roster_store_reopen");
    {
        let store = JsonFileStore::open(&temp.path).expect("open should succeed");
        store
            .add_record("cipher-1", RecordType::Teacher, "Smirnov Oleg")
            .expect("add");
        store
            .add_record("cipher-2", RecordType::Teacher, "Orlova Anna")
            .expect("add");
    }

    let store = JsonFileStore::open(&temp.path).expect("reopen should succeed");
    let record = store
        .get_by_id(2)
        .expect("get should succeed")
        .expect("record 2 should exist");
    assert_eq!(record.encrypted_data, "cipher-2");
    assert_eq!(record.record_type, RecordType::Teacher);

    let stats = store.stats().expect("stats should succeed");
    assert_eq!(stats.total, 2);
    assert_eq!(stats.count(RecordType::Teacher), 2);
    assert_eq!(stats.count(RecordType::Parent), 0);
}

#[test]
fn test_store_file_layout() {
    let temp = TempFile::new("roster_store_layout");
    let store = JsonFileStore::open(&temp.path).expect("open should succeed");
    store
        .add_record("Y2lwaGVy", RecordType::Parent, "Petrov")
        .expect("add");

    let raw: serde_json::Value =
        serde_json::from_slice(&fs::read(&temp.path).expect("read")).expect("valid json");
    let record = &raw["records"][0];
    assert_eq!(record["id"], 1);
    assert_eq!(record["type"], "parent");
    assert_eq!(record["description"], "Petrov");
    assert_eq!(record["encrypted_data"], "Y2lwaGVy");
    assert!(record["created_at"].is_string());
    assert!(record["updated_at"].is_string());
}
