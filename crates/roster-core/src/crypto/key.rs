//! Key derivation using PBKDF2-HMAC-SHA-256.
//!
//! The salt is chosen by [`SaltPolicy`]. The default embeds a fixed salt in
//! the binary, so the same password yields the same key on every run without
//! storing anything. That also means every installation derives the same key
//! from the same password; deployments that care can configure their own
//! salt, or switch to a fresh salt per record.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, RosterError};

/// PBKDF2 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Length of derived key in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Minimum accepted salt length.
pub const MIN_SALT_LENGTH: usize = 16;

/// Salt used by [`SaltPolicy::Embedded`].
pub const EMBEDDED_SALT: &[u8] = b"school_data_protection_2024";

/// Where the key-derivation salt comes from.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum SaltPolicy {
    /// Fixed salt compiled into the binary. Stateless, shared by all installs.
    #[default]
    Embedded,
    /// Salt configured for this deployment. Must be kept with the store.
    Deployment(Vec<u8>),
    /// Fresh random salt per encryption, stored in front of each envelope.
    PerRecord,
}

impl SaltPolicy {
    /// Short name used in configuration and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Deployment(_) => "deployment",
            Self::PerRecord => "per_record",
        }
    }
}

impl std::fmt::Debug for SaltPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deployment(salt) => write!(f, "Deployment({} bytes)", salt.len()),
            other => f.write_str(other.name()),
        }
    }
}

/// A cryptographic key derived from a password.
///
/// Key material is zeroized when dropped and never shown by `Debug`.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a password and salt.
///
/// Same password + salt always produces the same key.
///
/// # Examples
///
/// ```
/// use roster_core::crypto::{derive_key, EMBEDDED_SALT};
///
/// let key = derive_key("my-password", EMBEDDED_SALT).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(password: &str, salt: &[u8]) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(RosterError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    if salt.len() < MIN_SALT_LENGTH {
        return Err(RosterError::InvalidInput(format!(
            "Salt must be at least {} bytes",
            MIN_SALT_LENGTH
        )));
    }

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);

    Ok(DerivedKey { key })
}

/// Draw a fresh random salt of [`MIN_SALT_LENGTH`] bytes.
pub fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; MIN_SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}
