//! Display formatting for prices and counts.
//!
//! The formatting contract is shared with the exported reports: floating
//! statistics are truncated toward zero before comma-grouping, never rounded.
//! Rounding here would silently break byte-parity between the on-screen
//! summary and the exported artifacts.

/// Comma-group a non-negative integer: `1234567` becomes `"1,234,567"`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a price for the Korean summary block: truncated toward zero,
/// comma-grouped, with the `원` unit.
pub fn format_won(price: f64) -> String {
    format!("{} 원", group_thousands(price as i64))
}

/// Format a hospital count for the summary block: `"N 곳"`.
pub fn format_count(count: usize) -> String {
    format!("{count} 곳")
}

/// Format a price for the ASCII document: truncated toward zero,
/// comma-grouped, `KRW` suffix.
pub fn format_krw(price: f64) -> String {
    format!("{} KRW", group_thousands(price as i64))
}

/// Comma-group a price without a unit (document table cells).
pub fn format_price_plain(price: f64) -> String {
    group_thousands(price as i64)
}

/// Truncate a string to at most `max_chars` characters, respecting char
/// boundaries (hospital names are not valid to slice at byte offsets).
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
