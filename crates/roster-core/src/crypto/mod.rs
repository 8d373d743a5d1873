//! Cryptographic operations for Roster.
//!
//! - **PBKDF2-HMAC-SHA-256**: password-based key derivation (100,000 rounds)
//! - **AES-256-GCM**: authenticated encryption with a random 96-bit nonce
//!
//! ## Security Model
//!
//! - Keys are derived from the password on every run and never persisted
//! - Key material is zeroized from memory on drop
//! - Tampering, corruption and wrong passwords all surface as
//!   `RosterError::Decryption`; decryption is all-or-nothing
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft or modification of the record table
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / process memory

pub mod cipher;
pub mod key;
pub mod password;

pub use cipher::{EncryptionContext, Fields, ENCRYPTED_AT_FIELD};
pub use key::{derive_key, generate_salt, DerivedKey, SaltPolicy, EMBEDDED_SALT, MIN_SALT_LENGTH};
pub use password::{is_weak_password, validate_password};
