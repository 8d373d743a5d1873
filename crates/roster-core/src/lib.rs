//! # Roster Core
//!
//! Core library for Roster - encrypted storage for student, teacher and parent
//! records, with sensitive operations gated behind one-time confirmation codes.
//!
//! This crate provides the domain logic independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **crypto**: Password-based key derivation and authenticated encryption
//! - **storage**: File-backed record table holding opaque ciphertexts
//! - **otp**: One-time confirmation codes bound to an operation
//! - **messaging**: Gateway contract for delivering codes and notices
//! - **gatekeeper**: Issues codes and delivers them with a bounded timeout
//! - **validation**: Required-field checks per record type

pub mod crypto;
pub mod error;
pub mod fs;
pub mod gatekeeper;
pub mod messaging;
pub mod otp;
pub mod storage;
pub mod validation;

pub use crypto::{EncryptionContext, Fields, SaltPolicy};
pub use error::{Result, RosterError};
pub use gatekeeper::{Challenge, Gatekeeper, GatewayFailurePolicy};
pub use messaging::{Delivery, DisabledGateway, LogFileGateway, MessageGateway};
pub use otp::{ConfirmationService, OperationTag, Verification};
pub use storage::{JsonFileStore, RecordStore, RecordType};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
