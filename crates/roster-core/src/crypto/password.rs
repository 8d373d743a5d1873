//! Password checks.
//!
//! Empty passwords are rejected outright. Short passwords are allowed but
//! reported as weak so the front end can warn.

use crate::error::{Result, RosterError};

/// Passwords shorter than this many characters are considered weak.
pub const RECOMMENDED_PASSWORD_LENGTH: usize = 8;

/// Validate that a password can be used for key derivation.
///
/// # Examples
///
/// ```
/// use roster_core::crypto::validate_password;
///
/// assert!(validate_password("correct horse").is_ok());
/// assert!(validate_password("   ").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(RosterError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Returns `true` when the password is shorter than the recommended length.
pub fn is_weak_password(password: &str) -> bool {
    password.chars().count() < RECOMMENDED_PASSWORD_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_password_rejected() {
        assert!(validate_password("").is_err());
        assert!(validate_password("   ").is_err());
        assert!(validate_password("\n\t").is_err());
    }

    #[test]
    fn test_short_password_accepted_but_weak() {
        assert!(validate_password("abc").is_ok());
        assert!(is_weak_password("abc"));
    }

    #[test]
    fn test_weakness_counts_characters_not_bytes() {
        // Eight Cyrillic characters are sixteen bytes.
        let password = "пароль12";
        assert_eq!(password.chars().count(), 8);
        assert!(!is_weak_password(password));
    }
}
