//! Core data types for the storage layer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RosterError;

/// Kind of person a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Student,
    Teacher,
    Parent,
}

impl RecordType {
    pub const ALL: [RecordType; 3] = [Self::Student, Self::Teacher, Self::Parent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = RosterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "parent" => Ok(Self::Parent),
            other => Err(RosterError::InvalidInput(format!(
                "Unknown record type '{}' (expected student, teacher or parent)",
                other
            ))),
        }
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique, immutable identifier (starts at 1)
    pub id: u64,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Plain-text description derived from name fields
    pub description: String,

    /// Base64 ciphertext envelope
    pub encrypted_data: String,

    /// When this record was created
    pub created_at: DateTime<Utc>,

    /// Last time ciphertext or description changed
    pub updated_at: DateTime<Utc>,
}

/// Record counts by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total: usize,
    pub by_type: BTreeMap<RecordType, usize>,
}

impl StoreStats {
    /// Aggregate counts over a slice of records.
    pub fn from_records(records: &[Record]) -> Self {
        let mut by_type = BTreeMap::new();
        for record in records {
            *by_type.entry(record.record_type).or_insert(0) += 1;
        }
        Self {
            total: records.len(),
            by_type,
        }
    }

    /// Count for a single type, zero when absent.
    pub fn count(&self, record_type: RecordType) -> usize {
        self.by_type.get(&record_type).copied().unwrap_or(0)
    }
}

/// On-disk shape of the record table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RecordTable {
    pub records: Vec<Record>,
}

impl RecordTable {
    /// Next free id: one past the highest id currently present.
    pub fn next_id(&self) -> u64 {
        self.records.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }
}
