//! Validation of command-line values.
//!
//! These double as clap value parsers, so bad input is reported before any
//! work starts.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Largest day accepted; keeps days exact when exchanged as JSON numbers.
pub const MAX_DAY: u64 = (1 << 53) - 1;

static RE_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap());

/// Parses a 1-based day number.
///
/// # Example
///
/// ```
/// use bibleurl::args::parse_day;
///
/// assert_eq!(parse_day("42").unwrap(), 42);
/// assert!(parse_day("-1").is_err());
/// ```
pub fn parse_day(value: &str) -> Result<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!(
            "Invalid day \"{value}\". Day must be a positive integer."
        )));
    }
    match value.parse::<u64>() {
        Ok(day) if (1..=MAX_DAY).contains(&day) => Ok(day),
        _ => Err(Error::Validation("Day must be a positive, safe integer.".to_string())),
    }
}

/// Checks a version code such as `NIV` or `NASB1995`.
pub fn parse_version(value: &str) -> Result<String> {
    if RE_VERSION.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(Error::Validation(format!("Invalid version \"{value}\".")))
    }
}
