//! Application-level utilities for the Roster CLI.
//!
//! This module provides:
//! - Path resolution for config and store files
//! - Password prompting
//! - Confirmation-code collection around sensitive operations

mod confirm;
mod context;
mod password;
mod resolver;

pub use confirm::Operation;
pub use context::AppContext;
pub use password::PasswordUse;
pub use resolver::resolve_config_path;
