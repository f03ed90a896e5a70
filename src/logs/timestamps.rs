//! Timestamp extraction from free-form log lines.
//!
//! Two layouts are recognised, tried in order:
//!
//! - ISO 8601 `2024-05-01T10:00:00[.123456][Z]`, normalized to end in `Z`
//! - `2024-05-01 10:00:00`, rewritten to `2024-05-01T10:00:00Z`
//!
//! Offsets other than `Z` are not interpreted; the result is only used as a
//! lexicographic sort key.

use once_cell::sync::Lazy;
use regex::Regex;

static ISO_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z?)")
        .expect("ISO timestamp regex is valid")
});

static SPACED_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").expect("spaced timestamp regex is valid")
});

/// First timestamp on the line, normalized to `YYYY-MM-DDTHH:MM:SS[.f]Z`.
pub fn extract_timestamp(line: &str) -> Option<String> {
    if let Some(found) = ISO_TIMESTAMP.find(line) {
        let ts = found.as_str();
        return Some(if ts.ends_with('Z') {
            ts.to_string()
        } else {
            format!("{ts}Z")
        });
    }

    SPACED_TIMESTAMP
        .find(line)
        .map(|found| format!("{}Z", found.as_str().replacen(' ', "T", 1)))
}
