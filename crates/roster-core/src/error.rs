//! Error types for Roster core operations.
//!
//! Every failure path of the core is a variant here, so callers must handle
//! each one explicitly. The CLI layer maps these to exit codes and
//! user-friendly messages.

use thiserror::Error;

/// Result type alias for Roster operations.
pub type Result<T> = std::result::Result<T, RosterError>;

/// Core error type for Roster operations.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Missing or malformed required field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication failure, wrong key, or malformed ciphertext
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Unknown record id or unknown/consumed confirmation code
    #[error("Not found: {0}")]
    NotFound(String),

    /// Confirmation code is older than its time-to-live
    #[error("Confirmation code expired")]
    Expired,

    /// Confirmation code exists but was issued for another operation
    #[error("Confirmation code does not match the operation (expected {expected})")]
    Mismatch { expected: String },

    /// Confirmation code could not be delivered
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Record table unreadable or unwritable
    #[error("Storage error: {0}")]
    Storage(String),

    /// Key derivation or cipher setup failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// In-process state is unusable: a poisoned lock or an exhausted
    /// code space. Never caused by user input.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for RosterError {
    fn from(err: std::io::Error) -> Self {
        RosterError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        RosterError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_storage() {
        let err: RosterError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, RosterError::Storage(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_internal_message() {
        let err = RosterError::Internal("lock poisoned".to_string());
        assert_eq!(err.to_string(), "Internal error: lock poisoned");
    }

    #[test]
    fn test_mismatch_message_names_expected_operation() {
        let err = RosterError::Mismatch {
            expected: "decrypt".to_string(),
        };
        assert!(err.to_string().contains("decrypt"));
    }
}
