//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use roster_core::RosterError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, store, record)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong password, tampered data)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Confirmation code rejected, expired, or undeliverable
    ConfirmationFailed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::ConfirmationFailed(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::ConfirmationFailed(_) => exit_codes::CONFIRMATION_FAILED,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

impl CliError {
    /// Map a core error onto a CLI error with a dedicated exit code.
    ///
    /// Storage and crypto-setup failures have no dedicated code and return
    /// `None`; they surface as general errors.
    pub fn from_core(err: &RosterError) -> Option<Self> {
        let mapped = match err {
            RosterError::NotFound(what) => CliError::not_found(
                format!("Not found: {}", what),
                "Hint: run `roster list` to see existing records.",
            ),
            RosterError::Decryption(_) => CliError::auth_failed_with_hint(
                err.to_string(),
                "Hint: check the password and salt settings used when the data was encrypted.",
            ),
            RosterError::Validation(_) | RosterError::InvalidInput(_) => {
                CliError::InvalidInput(err.to_string())
            }
            RosterError::Expired | RosterError::Mismatch { .. } | RosterError::Delivery(_) => {
                CliError::ConfirmationFailed(err.to_string())
            }
            RosterError::Storage(_) | RosterError::Crypto(_) | RosterError::Internal(_) => {
                return None
            }
        };
        Some(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::exit_codes;

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let cases = [
            (RosterError::NotFound("Record 9".into()), exit_codes::NOT_FOUND),
            (RosterError::Decryption("tag".into()), exit_codes::AUTH_FAILED),
            (RosterError::Validation("class".into()), exit_codes::INVALID_INPUT),
            (RosterError::Expired, exit_codes::CONFIRMATION_FAILED),
            (
                RosterError::Mismatch {
                    expected: "decrypt".into(),
                },
                exit_codes::CONFIRMATION_FAILED,
            ),
            (RosterError::Delivery("down".into()), exit_codes::CONFIRMATION_FAILED),
        ];
        for (err, code) in cases {
            let mapped = CliError::from_core(&err).expect("should map");
            assert_eq!(mapped.exit_code(), code);
        }
    }

    #[test]
    fn test_storage_errors_stay_general() {
        assert!(CliError::from_core(&RosterError::Storage("disk".into())).is_none());
        assert!(CliError::from_core(&RosterError::Internal("lock".into())).is_none());
    }

    #[test]
    fn test_not_found_display_includes_hint() {
        let err = CliError::not_found("No store", "Hint: run `roster init`.");
        assert_eq!(err.to_string(), "No store\nHint: run `roster init`.");
    }
}
