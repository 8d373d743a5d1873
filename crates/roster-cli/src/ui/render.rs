//! Output helpers shared by the commands.
//!
//! Plain mode output is meant to be parsed: receipts start with
//! `status=ok`, keys are lower-cased with underscores, table rows are
//! tab-separated without a header.

use comfy_table::presets::NOTHING;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use super::terminal::{Marker, Style, UiContext};

fn plain_key(key: &str) -> String {
    key.to_lowercase().replace(' ', "_")
}

fn marked(ui: &UiContext, marker: Marker, text: &str) -> String {
    format!(
        "{} {}",
        ui.paint(marker.symbol(ui.unicode), marker.style()),
        text
    )
}

pub fn title(ui: &UiContext, text: &str) -> String {
    ui.paint(text, Style::Bold)
}

/// One `Key: value` line (pretty) or `key=value` line (plain).
pub fn kv(ui: &UiContext, key: &str, value: &str) -> String {
    if ui.mode.is_pretty() {
        format!("{} {}", ui.paint(&format!("{}:", key), Style::Dim), value)
    } else {
        format!("{}={}", plain_key(key), value)
    }
}

pub fn hint(ui: &UiContext, text: &str) -> String {
    if ui.mode.is_pretty() {
        format!("{} {}", ui.paint("Hint:", Style::Dim), text)
    } else {
        format!("hint={}", text)
    }
}

/// Summary printed after a command changed something.
pub fn receipt(ui: &UiContext, heading: &str, items: &[(&str, &str)]) -> String {
    let (first, indent) = if ui.mode.is_pretty() {
        (marked(ui, Marker::Done, heading), "  ")
    } else {
        ("status=ok".to_string(), "")
    };

    std::iter::once(first)
        .chain(
            items
                .iter()
                .map(|(key, value)| format!("{}{}", indent, kv(ui, key, value))),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

/// Borderless table in pretty mode; tab-separated rows otherwise.
pub fn table(ui: &UiContext, headers: &[&str], rows: &[Vec<String>]) -> String {
    if !ui.mode.is_pretty() {
        return rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut out = Table::new();
    out.load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(u16::try_from(ui.width).unwrap_or(u16::MAX))
        .set_header(headers.iter().map(|header| {
            let cell = Cell::new(header);
            if ui.color {
                cell.add_attribute(Attribute::Dim)
            } else {
                cell
            }
        }));
    for column in out.column_iter_mut() {
        column.set_padding((0, 2));
    }
    for row in rows {
        out.add_row(row);
    }
    out.to_string()
}

/// Print to stdout; suppressed in JSON mode so stdout stays one document.
pub fn print(ui: &UiContext, message: &str) {
    if !ui.mode.is_json() {
        println!("{}", message);
    }
}

/// Warnings always go to stderr.
pub fn warn(ui: &UiContext, message: &str) {
    if ui.mode.is_pretty() {
        eprintln!("{}", marked(ui, Marker::Caution, message));
    } else {
        eprintln!("warning={}", message);
    }
}
