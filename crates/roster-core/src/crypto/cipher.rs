//! Authenticated encryption of records and raw buffers.
//!
//! Envelope layout (before base64, for records):
//!
//! ```text
//! [SALT(16), per-record policy only][NONCE(12)][CIPHERTEXT(N)][TAG(16)]
//! ```
//!
//! Records are serialised as a JSON object with sorted keys, carrying an
//! extra `_encrypted_at` timestamp that is stripped again on decryption.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use super::key::{derive_key, DerivedKey, SaltPolicy, EMBEDDED_SALT, MIN_SALT_LENGTH};
use super::password::validate_password;
use crate::error::{Result, RosterError};

/// A record's plaintext fields. Sorted keys give a canonical encoding.
pub type Fields = BTreeMap<String, String>;

/// Reserved field injected into every encrypted record.
pub const ENCRYPTED_AT_FIELD: &str = "_encrypted_at";

/// AES-GCM nonce length (96-bit).
pub const NONCE_LEN: usize = 12;

/// AES-GCM tag length (128-bit).
pub const TAG_LEN: usize = 16;

/// Length of the salt prefix written under [`SaltPolicy::PerRecord`].
pub const RECORD_SALT_LEN: usize = MIN_SALT_LENGTH;

enum Keying {
    Fixed(DerivedKey),
    PerRecord(SecretString),
}

/// Session-scoped encryption state bound to exactly one password.
///
/// Built once per session and never persisted. A context derived from a
/// different password fails to decrypt with `RosterError::Decryption`.
pub struct EncryptionContext {
    keying: Keying,
}

impl std::fmt::Debug for EncryptionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.keying {
            Keying::Fixed(_) => "fixed",
            Keying::PerRecord(_) => "per_record",
        };
        f.debug_struct("EncryptionContext")
            .field("mode", &mode)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl EncryptionContext {
    /// Derive a context from `password` using the embedded salt.
    pub fn new(password: &str) -> Result<Self> {
        Self::initialize(password, &SaltPolicy::Embedded)
    }

    /// Derive a context from `password` under the given salt policy.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::InvalidInput` for an empty password or a
    /// deployment salt shorter than 16 bytes.
    pub fn initialize(password: &str, policy: &SaltPolicy) -> Result<Self> {
        validate_password(password)?;

        let keying = match policy {
            SaltPolicy::Embedded => Keying::Fixed(derive_key(password, EMBEDDED_SALT)?),
            SaltPolicy::Deployment(salt) => Keying::Fixed(derive_key(password, salt)?),
            SaltPolicy::PerRecord => Keying::PerRecord(SecretString::from(password.to_string())),
        };
        debug!(salt_policy = policy.name(), "encryption context initialized");

        Ok(Self { keying })
    }

    /// Encrypt a record's fields into base64 envelope text.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Validation` if `fields` already carries the
    /// reserved `_encrypted_at` key.
    pub fn encrypt(&self, fields: &Fields) -> Result<String> {
        if fields.contains_key(ENCRYPTED_AT_FIELD) {
            return Err(RosterError::Validation(format!(
                "Field name {} is reserved",
                ENCRYPTED_AT_FIELD
            )));
        }

        let mut payload = fields.clone();
        payload.insert(ENCRYPTED_AT_FIELD.to_string(), Utc::now().to_rfc3339());
        let json = Zeroizing::new(
            serde_json::to_vec(&payload)
                .map_err(|e| RosterError::Crypto(format!("Failed to encode record: {}", e)))?,
        );
        let sealed = self.encrypt_bytes(&json)?;

        Ok(STANDARD.encode(sealed))
    }

    /// Decrypt base64 envelope text back into the original fields.
    ///
    /// ASCII whitespace anywhere in the text is ignored, so envelopes that
    /// were line-wrapped by a mail client or terminal still decode.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Decryption` if the text is not base64, the tag
    /// does not verify, or the plaintext is not a map of strings.
    pub fn decrypt(&self, ciphertext: &str) -> Result<Fields> {
        let compact: String = ciphertext
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let sealed = STANDARD.decode(compact).map_err(|e| {
            RosterError::Decryption(format!("Ciphertext is not valid base64: {}", e))
        })?;
        let plaintext = self.decrypt_bytes(&sealed)?;

        let mut fields: Fields = serde_json::from_slice(&plaintext).map_err(|_| {
            RosterError::Decryption("Decrypted payload is not a record".to_string())
        })?;
        fields.remove(ENCRYPTED_AT_FIELD);

        Ok(fields)
    }

    /// Encrypt a raw buffer.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        match &self.keying {
            Keying::Fixed(key) => seal(key, plaintext),
            Keying::PerRecord(password) => {
                let mut salt = [0u8; RECORD_SALT_LEN];
                OsRng.fill_bytes(&mut salt);
                let key = derive_key(password.expose_secret(), &salt)?;

                let sealed = seal(&key, plaintext)?;
                let mut out = Vec::with_capacity(RECORD_SALT_LEN + sealed.len());
                out.extend_from_slice(&salt);
                out.extend_from_slice(&sealed);
                Ok(out)
            }
        }
    }

    /// Decrypt a raw buffer produced by [`EncryptionContext::encrypt_bytes`].
    ///
    /// The plaintext is wiped from memory when the returned value is dropped.
    pub fn decrypt_bytes(&self, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match &self.keying {
            Keying::Fixed(key) => open(key, sealed),
            Keying::PerRecord(password) => {
                if sealed.len() < RECORD_SALT_LEN {
                    return Err(RosterError::Decryption(
                        "Ciphertext is truncated".to_string(),
                    ));
                }
                let (salt, rest) = sealed.split_at(RECORD_SALT_LEN);
                let key = derive_key(password.expose_secret(), salt)?;
                open(&key, rest)
            }
        }
    }

    /// Encrypt the file at `input` into `output`.
    pub fn encrypt_file(&self, input: &Path, output: &Path) -> Result<()> {
        let plaintext = Zeroizing::new(fs::read(input).map_err(|e| {
            RosterError::Storage(format!("Failed to read {}: {}", input.display(), e))
        })?);
        let sealed = self.encrypt_bytes(&plaintext)?;
        crate::fs::write_atomic(output, &sealed).map_err(|e| {
            RosterError::Storage(format!("Failed to write {}: {}", output.display(), e))
        })?;
        debug!(bytes = plaintext.len(), "file encrypted");
        Ok(())
    }

    /// Decrypt the file at `input` into `output`.
    ///
    /// Nothing is written unless decryption succeeds.
    pub fn decrypt_file(&self, input: &Path, output: &Path) -> Result<()> {
        let sealed = fs::read(input).map_err(|e| {
            RosterError::Storage(format!("Failed to read {}: {}", input.display(), e))
        })?;
        let plaintext = self.decrypt_bytes(&sealed)?;
        crate::fs::write_atomic(output, &plaintext).map_err(|e| {
            RosterError::Storage(format!("Failed to write {}: {}", output.display(), e))
        })?;
        debug!(bytes = plaintext.len(), "file decrypted");
        Ok(())
    }
}

fn cipher_for(key: &DerivedKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| RosterError::Crypto(format!("Invalid key length: {}", e)))
}

fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| RosterError::Crypto("AEAD encryption failed".to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

fn open(key: &DerivedKey, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(RosterError::Decryption(
            "Ciphertext is truncated".to_string(),
        ));
    }
    let cipher = cipher_for(key)?;
    let (nonce, body) = sealed.split_at(NONCE_LEN);

    let plaintext = cipher.decrypt(Nonce::from_slice(nonce), body).map_err(|_| {
        debug!("authentication tag rejected");
        RosterError::Decryption(
            "Authentication failed (wrong password or tampered data)".to_string(),
        )
    })?;

    Ok(Zeroizing::new(plaintext))
}
