//! Password input.
//!
//! `ROSTER_PASSWORD` wins when set; otherwise the password is prompted on
//! the terminal. Non-interactive runs without the variable fail. Prompts
//! for commands that encrypt ask twice, since a typo there produces data
//! nobody can decrypt.

use std::io::IsTerminal;

use dialoguer::Password;
use zeroize::Zeroizing;

use roster_core::crypto::is_weak_password;

use crate::constants::env_vars;
use crate::errors::CliError;

/// What the password is about to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordUse {
    /// New ciphertext will be written under this password.
    Encrypt,
    /// Existing ciphertext will be read; a wrong password just fails.
    Decrypt,
}

impl PasswordUse {
    /// Confirmation prompt and mismatch message, when one is required.
    pub fn confirmation(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Encrypt => Some(("Confirm password", "Passwords do not match")),
            Self::Decrypt => None,
        }
    }
}

fn from_env() -> Option<Zeroizing<String>> {
    std::env::var(env_vars::PASSWORD)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Zeroizing::new)
}

fn prompt(purpose: PasswordUse) -> anyhow::Result<Zeroizing<String>> {
    let mut input = Password::new().with_prompt("Password");
    if let Some((confirm, mismatch)) = purpose.confirmation() {
        input = input.with_confirmation(confirm, mismatch);
    }
    let value = input
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?;
    Ok(Zeroizing::new(value))
}

fn resolve(
    purpose: PasswordUse,
    env_value: Option<Zeroizing<String>>,
    interactive: bool,
) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = env_value {
        return Ok(value);
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No password available; set {} or run interactively",
            env_vars::PASSWORD
        ))
        .into());
    }
    prompt(purpose)
}

/// Read the password for `purpose`.
pub fn read_password(purpose: PasswordUse) -> anyhow::Result<Zeroizing<String>> {
    resolve(purpose, from_env(), std::io::stdin().is_terminal())
}

/// Whether a warning about password strength should be shown.
pub fn weak_password_warning(password: &str) -> Option<&'static str> {
    is_weak_password(password)
        .then_some("Password is shorter than 8 characters; consider a longer one")
}
