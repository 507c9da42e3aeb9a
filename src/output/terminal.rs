//! Terminal output utilities.
//!
//! Provides formatting helpers for terminal output.

use crate::error::ParseError;
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// One highlighted line describing a rejected input line, for stderr.
pub fn format_parse_error(err: &ParseError) -> String {
    let location = err
        .line
        .map(|l| format!("line {l}"))
        .unwrap_or_else(|| "input".to_string());
    format!(
        "{failed} {location}: '{input}' {reason}",
        failed = "invalid".on_red(),
        input = err.input.trim().yellow(),
        reason = err.reason
    )
}
