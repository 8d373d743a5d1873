//! Terminal output for the Roster CLI.
//!
//! Output is pretty on an interactive terminal, `key=value` plain text when
//! piped, and a single JSON document with `--json`.

mod render;
mod terminal;

pub use render::{hint, kv, print, receipt, table, title, warn};
pub use terminal::UiContext;
