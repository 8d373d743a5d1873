//! Record storage.
//!
//! The store persists opaque ciphertexts alongside a plain-text description
//! and timestamps. It never inspects or decrypts the payload.

pub mod json_file;
pub mod traits;
pub mod types;

pub use json_file::JsonFileStore;
pub use traits::RecordStore;
pub use types::{Record, RecordType, StoreStats};
