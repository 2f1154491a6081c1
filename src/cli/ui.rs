use crate::core::format::NOT_AVAILABLE;
use chrono::{DateTime, Local, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Success,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Success => style(text).green(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned cell for an already formatted value. "N/A" is dimmed.
pub fn value_cell(text: String) -> Cell {
    let cell = Cell::new(&text).set_alignment(CellAlignment::Right);
    if text == NOT_AVAILABLE {
        cell.fg(Color::DarkGrey)
    } else {
        cell
    }
}

/// Cell for a ratio shown as a percentage, green when positive, red when negative.
pub fn signed_cell(value: Option<f64>, text: String) -> Cell {
    let cell = value_cell(text);
    match value {
        Some(v) if v > 0.0 => cell.fg(Color::Green),
        Some(v) if v < 0.0 => cell.fg(Color::Red),
        _ => cell,
    }
}

/// Cell for a transaction amount. Negative backend amounts are inflows.
pub fn amount_cell(amount: f64, text: String) -> Cell {
    let color = if amount < 0.0 { Color::Green } else { Color::Red };
    Cell::new(text)
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Creates a spinner shown while a backend call is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints a separator line matching the terminal width.
/// Subtle footer saying when a snapshot was fetched, in local time.
pub fn fetched_at_line(fetched_at: DateTime<Utc>) -> String {
    let local = fetched_at.with_timezone(&Local);
    style_text(
        &format!("Fetched at {}", local.format("%Y-%m-%d %H:%M:%S")),
        StyleType::Subtle,
    )
}

pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
