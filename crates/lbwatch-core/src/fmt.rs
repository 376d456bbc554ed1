//! Shared formatting helpers for dashboard widgets.
//!
//! Pure string formatting only; styles and layout live in `tui`.

use chrono::{DateTime, Local};

/// Placeholder for identity fields the appliance did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Controls compact (trend axis, narrow cells) vs verbose (labels) output.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FmtStyle {
    /// Compact: short suffixes ("1.2K/s")
    Compact,
    /// Detail: whole number with unit ("1247 req/s")
    Detail,
}

/// Format a percentage with one decimal: `"23.5%"`.
pub fn format_percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.1}%", value)
}

/// Format a request rate.
///
/// Compact: `"850/s"`, `"1.2K/s"`, `"3.4M/s"`
/// Detail:  `"1247 req/s"`
pub fn format_rate(rate: f64, style: FmtStyle) -> String {
    let rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
    match style {
        FmtStyle::Detail => format!("{:.0} req/s", rate),
        FmtStyle::Compact => {
            if rate >= 1_000_000.0 {
                format!("{:.1}M/s", rate / 1_000_000.0)
            } else if rate >= 1_000.0 {
                format!("{:.1}K/s", rate / 1_000.0)
            } else {
                format!("{:.0}/s", rate)
            }
        }
    }
}

/// `value`, or `"N/A"` when it is blank.
pub fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

/// Wall clock time as `"HH:MM:SS"`.
pub fn format_clock(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Age of a sample relative to `now`: `"4s ago"`, `"2m ago"`, or `"never"`.
pub fn format_age(at: Option<DateTime<Local>>, now: DateTime<Local>) -> String {
    let Some(at) = at else {
        return "never".to_string();
    };
    let secs = (now - at).num_seconds().max(0);
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

/// Truncate string to `max_len` characters with unicode ellipsis (`…`).
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_len.saturating_sub(1)).collect();
    out.push('…');
    out
}
