//! Shared helper functions for CLI commands
//!
//! Small formatting routines used by more than one command module.

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a cell for a Markdown table
pub fn escape_md(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Render a value with a fixed number of decimals
pub fn fixed(value: f64, places: usize) -> String {
    format!("{:.*}", places, value)
}

/// Render an optional statistic, `-` when absent
pub fn fixed_or_dash(value: Option<f64>, places: usize) -> String {
    value
        .map(|v| fixed(v, places))
        .unwrap_or_else(|| "-".to_string())
}

/// Parse a comma-separated field list, dropping blanks
pub fn split_fields(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|s| s.split(','))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
