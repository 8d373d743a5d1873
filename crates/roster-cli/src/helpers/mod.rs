//! Helper functions for CLI operations.

mod parsing;

pub use parsing::{merge_fields, parse_fields, parse_record_type, read_fields_file};
