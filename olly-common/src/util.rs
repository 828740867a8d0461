//! Utility functions for Olly services.

use crate::error::{Error, Result};

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// This function safely handles multi-byte UTF-8 characters (emoji, CJK, accented characters)
/// by using character boundaries instead of byte indices.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Parse a duration string like "5m", "1h", "30s" into seconds.
///
/// A bare number is read as seconds.
pub fn parse_duration_secs(s: &str) -> Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::InvalidInput("Empty duration string".into()));
    }

    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }

    let unit_start = s.char_indices().last().map_or(0, |(idx, _)| idx);
    let (num_str, unit) = s.split_at(unit_start);
    let num: u64 = num_str
        .parse()
        .map_err(|_| Error::InvalidInput(format!("Invalid number: {num_str}")))?;

    match unit {
        "s" => Ok(num),
        "m" => Ok(num.saturating_mul(60)),
        "h" => Ok(num.saturating_mul(3600)),
        "d" => Ok(num.saturating_mul(86_400)),
        _ => Err(Error::InvalidInput(format!("Unknown unit: {unit}"))),
    }
}
