use chrono::{DateTime, Local, Utc};
use comfy_table::{Attribute, Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while waiting on TMDB. Falls back to structured logging
/// when not attached to a terminal.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let message = message.into();
        if !is_interactive() {
            tracing::info!(operation = "progress", message = %message, "Progress update");
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "))
        {
            bar.set_style(style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }

    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Table with the rounded UTF-8 look used throughout the CLI.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

/// Epoch milliseconds as local `YYYY-MM-DD HH:MM`.
pub fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Minutes as `1h 39m`, or `-` when unknown.
pub fn format_minutes(minutes: Option<i32>) -> String {
    match minutes {
        Some(m) if m > 0 => {
            let (h, m) = (m / 60, m % 60);
            if h == 0 {
                format!("{}m", m)
            } else {
                format!("{}h {:02}m", h, m)
            }
        }
        _ => "-".to_string(),
    }
}

/// Release year out of a TMDB `YYYY-MM-DD` date.
pub fn year(date: Option<&str>) -> String {
    date.and_then(|d| d.get(..4))
        .filter(|y| !y.is_empty())
        .unwrap_or("-")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(Some(139)), "2h 19m");
        assert_eq!(format_minutes(Some(45)), "45m");
        assert_eq!(format_minutes(Some(0)), "-");
        assert_eq!(format_minutes(None), "-");
    }

    #[test]
    fn test_year() {
        assert_eq!(year(Some("1999-10-15")), "1999");
        assert_eq!(year(Some("")), "-");
        assert_eq!(year(None), "-");
    }

    #[test]
    fn test_format_millis_invalid() {
        assert_eq!(format_millis(i64::MAX), "-");
    }
}
