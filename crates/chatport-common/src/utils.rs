//! Common utility functions used across chatport components

use crate::constants::EXPORT_FILE_PREFIX;
use chrono::Datelike;

/// Calendar stamp `<month>-<day>`, 1-indexed month, no zero padding
pub fn month_day<D: Datelike>(date: &D) -> String {
    format!("{}-{}", date.month(), date.day())
}

/// File name for an export taken on `date`
pub fn export_filename<D: Datelike>(date: &D) -> String {
    format!("{}{}.json", EXPORT_FILE_PREFIX, month_day(date))
}

/// Truncate string to specified length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
