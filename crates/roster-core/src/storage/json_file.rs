//! JSON file storage backend.
//!
//! The whole table lives in one file shaped `{ "records": [...] }`. Every
//! mutating call reads the full table, edits it in memory, and rewrites the
//! full file atomically. A mutex serialises those sequences inside the
//! process; concurrent writers in other processes are not coordinated.
//!
//! Whole-file rewrites are fine for tens to low thousands of records. A
//! larger store would want an append-only log with compaction instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};

use super::traits::RecordStore;
use super::types::{Record, RecordTable, RecordType};
use crate::error::{Result, RosterError};

/// Record store backed by a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a handle for the table at `path` without touching the disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a handle and make sure the table file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        store.ensure_exists()?;
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hold the table lock, returning an error if the mutex is poisoned.
    fn lock_table(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| RosterError::Storage("Record table lock poisoned".to_string()))
    }

    fn read_table(&self) -> Result<RecordTable> {
        if !self.path.exists() {
            return Err(RosterError::Storage(format!(
                "Record store not found at {}",
                self.path.display()
            )));
        }
        let contents = fs::read(&self.path).map_err(|e| {
            RosterError::Storage(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_slice(&contents).map_err(|e| {
            RosterError::Storage(format!(
                "Record store {} is corrupted: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_table(&self, table: &RecordTable) -> Result<()> {
        let contents = serde_json::to_vec_pretty(table)?;
        crate::fs::write_atomic(&self.path, &contents).map_err(|e| {
            RosterError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        debug!(records = table.records.len(), "record table written");
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn ensure_exists(&self) -> Result<()> {
        let _guard = self.lock_table()?;
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    RosterError::Storage(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        self.write_table(&RecordTable::default())?;
        info!(path = %self.path.display(), "created empty record store");
        Ok(())
    }

    fn add_record(
        &self,
        encrypted_data: &str,
        record_type: RecordType,
        description: &str,
    ) -> Result<u64> {
        let _guard = self.lock_table()?;
        let mut table = self.read_table()?;

        let id = table.next_id();
        let now = Utc::now();
        table.records.push(Record {
            id,
            record_type,
            description: description.to_string(),
            encrypted_data: encrypted_data.to_string(),
            created_at: now,
            updated_at: now,
        });
        self.write_table(&table)?;

        info!(id, record_type = %record_type, "record added");
        Ok(id)
    }

    fn get_all(&self) -> Result<Vec<Record>> {
        let _guard = self.lock_table()?;
        Ok(self.read_table()?.records)
    }

    fn get_by_id(&self, id: u64) -> Result<Option<Record>> {
        let _guard = self.lock_table()?;
        Ok(self
            .read_table()?
            .records
            .into_iter()
            .find(|record| record.id == id))
    }

    fn delete_by_id(&self, id: u64) -> Result<bool> {
        let _guard = self.lock_table()?;
        let mut table = self.read_table()?;

        let initial_count = table.records.len();
        table.records.retain(|record| record.id != id);
        if table.records.len() == initial_count {
            debug!(id, "delete requested for unknown record");
            return Ok(false);
        }

        self.write_table(&table)?;
        info!(id, "record deleted");
        Ok(true)
    }

    fn update_by_id(&self, id: u64, encrypted_data: &str, description: &str) -> Result<()> {
        let _guard = self.lock_table()?;
        let mut table = self.read_table()?;

        let record = table
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| RosterError::NotFound(format!("Record {}", id)))?;
        record.encrypted_data = encrypted_data.to_string();
        record.description = description.to_string();
        record.updated_at = Utc::now();

        self.write_table(&table)?;
        info!(id, "record updated");
        Ok(())
    }
}
