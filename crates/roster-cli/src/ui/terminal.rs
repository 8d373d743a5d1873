//! Terminal detection and text styling.

use std::io::IsTerminal;

const FALLBACK_WIDTH: usize = 80;

/// How command output is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `--json`: a single JSON document on stdout, nothing else.
    Json,
    /// `key=value` lines and tab-separated rows, for pipes and scripts.
    #[default]
    Plain,
    /// Aligned tables and colour, only on an interactive stdout.
    Pretty,
}

impl OutputMode {
    /// `--json` always wins. A dumb terminal or a pipe gets plain output.
    pub fn select(json: bool, stdout_is_tty: bool, dumb_terminal: bool) -> Self {
        match (json, stdout_is_tty && !dumb_terminal) {
            (true, _) => Self::Json,
            (false, true) => Self::Pretty,
            (false, false) => Self::Plain,
        }
    }

    pub fn is_json(&self) -> bool {
        *self == Self::Json
    }

    pub fn is_pretty(&self) -> bool {
        *self == Self::Pretty
    }
}

/// ANSI styles used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Bold,
    Dim,
    Green,
    Yellow,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Self::Bold => "\x1b[1m",
            Self::Dim => "\x1b[2m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
        }
    }
}

/// Status marker printed in front of receipts and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Done,
    Caution,
}

impl Marker {
    pub fn symbol(self, unicode: bool) -> &'static str {
        match (self, unicode) {
            (Self::Done, true) => "[\u{2713}]",
            (Self::Done, false) => "[OK]",
            (Self::Caution, true) => "[!]",
            (Self::Caution, false) => "[WARN]",
        }
    }

    pub fn style(self) -> Style {
        match self {
            Self::Done => Style::Green,
            Self::Caution => Style::Yellow,
        }
    }
}

/// What the current terminal can show.
#[derive(Debug, Clone)]
pub struct UiContext {
    pub color: bool,
    pub unicode: bool,
    pub width: usize,
    pub mode: OutputMode,
}

impl UiContext {
    /// Inspect stdout and the environment (`TERM`, `NO_COLOR`, `COLUMNS`).
    pub fn from_env(json: bool) -> Self {
        let tty = std::io::stdout().is_terminal();
        let dumb = std::env::var("TERM").is_ok_and(|term| term == "dumb");
        let no_color = std::env::var_os("NO_COLOR").is_some();

        Self {
            color: tty && !dumb && !no_color,
            unicode: !dumb,
            width: columns_from_env().unwrap_or(FALLBACK_WIDTH),
            mode: OutputMode::select(json, tty, dumb),
        }
    }

    /// Apply `style` to `text` when colour is on.
    pub fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            format!("{}{}\x1b[0m", style.code(), text)
        } else {
            text.to_string()
        }
    }
}

fn columns_from_env() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()?
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|cols| *cols > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selection() {
        assert_eq!(OutputMode::select(true, true, false), OutputMode::Json);
        assert_eq!(OutputMode::select(true, false, true), OutputMode::Json);
        assert_eq!(OutputMode::select(false, true, false), OutputMode::Pretty);
        assert_eq!(OutputMode::select(false, true, true), OutputMode::Plain);
        assert_eq!(OutputMode::select(false, false, false), OutputMode::Plain);
    }

    #[test]
    fn test_paint_only_with_color() {
        let mut ui = UiContext {
            color: false,
            unicode: true,
            width: 80,
            mode: OutputMode::Pretty,
        };
        assert_eq!(ui.paint("ok", Style::Green), "ok");

        ui.color = true;
        assert_eq!(ui.paint("ok", Style::Green), "\x1b[32mok\x1b[0m");
    }

    #[test]
    fn test_marker_ascii_fallback() {
        assert_eq!(Marker::Done.symbol(false), "[OK]");
        assert_eq!(Marker::Caution.symbol(false), "[WARN]");
        assert_eq!(Marker::Caution.style(), Style::Yellow);
    }

    #[test]
    fn test_json_flag_reaches_context() {
        assert!(UiContext::from_env(true).mode.is_json());
    }
}
