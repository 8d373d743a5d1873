//! Command handlers.

pub mod files;
pub mod init;
pub mod messenger;
pub mod records;
pub mod text;
