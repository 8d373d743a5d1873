//! Record store trait definition.
//!
//! The `RecordStore` trait defines the interface that storage backends
//! implement. The orchestration layer only talks to this trait.

use super::types::{Record, RecordType, StoreStats};
use crate::error::Result;

/// Storage interface for encrypted records.
///
/// All implementations must ensure:
/// - Ids are unique for the lifetime of the store, even across deletions
/// - The ciphertext is stored verbatim and never inspected
/// - A read-modify-write sequence is not interleaved with another one
pub trait RecordStore: Send + Sync {
    /// Create an empty table if none exists. No-op otherwise.
    fn ensure_exists(&self) -> Result<()>;

    /// Append a record and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` if the table cannot be read or written.
    fn add_record(
        &self,
        encrypted_data: &str,
        record_type: RecordType,
        description: &str,
    ) -> Result<u64>;

    /// All records in storage order.
    fn get_all(&self) -> Result<Vec<Record>>;

    /// Get a record by id.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(record))` if found, `Ok(None)` if not found.
    fn get_by_id(&self, id: u64) -> Result<Option<Record>>;

    /// Remove a record. Returns whether anything was removed.
    fn delete_by_id(&self, id: u64) -> Result<bool>;

    /// Replace ciphertext and description of an existing record.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::NotFound` if no record has this id.
    fn update_by_id(&self, id: u64, encrypted_data: &str, description: &str) -> Result<()>;

    /// Counts by type plus total.
    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats::from_records(&self.get_all()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_dyn_store(_store: &dyn RecordStore) {}
    }
}
