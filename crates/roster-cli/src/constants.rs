//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, store, record).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input, arguments, or record fields.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong password, undecryptable data).
    pub const AUTH_FAILED: i32 = 5;

    /// Confirmation code rejected or could not be delivered.
    pub const CONFIRMATION_FAILED: i32 = 6;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    pub const CONFIG: &str = "ROSTER_CONFIG";
    pub const PASSWORD: &str = "ROSTER_PASSWORD";
    pub const LOG: &str = "ROSTER_LOG";
}

/// Default filter when `ROSTER_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";
