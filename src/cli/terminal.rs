//! Terminal capability detection and text formatting

use chrono::{DateTime, Datelike, Utc};
use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if terminal is narrow (< 80 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 80)
}

/// Shorten `text` to at most `len` characters, ending in `...` when cut.
pub fn truncate_text(text: &str, len: usize) -> String {
    if text.chars().count() <= len {
        return text.to_string();
    }
    let kept: String = text.chars().take(len.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Short date: `Mon D` within the current year, `Mon D, YYYY` otherwise.
pub fn format_time(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if time.year() == now.year() {
        time.format("%b %-d").to_string()
    } else {
        time.format("%b %-d, %Y").to_string()
    }
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}
