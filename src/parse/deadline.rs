use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Deadline format used both on disk and for user input: `dd-MM-yyyy`
pub const DEADLINE_FORMAT: &str = "%d-%m-%Y";

/// Zero-padded day, month and four-digit year. chrono alone accepts
/// unpadded fields and signed years, so the shape is checked first.
static DEADLINE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{2}-\d{4}$").expect("deadline pattern is valid"));

/// Error for deadline text that is not a strict `dd-MM-yyyy` date
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("invalid date format '{0}', use dd-MM-yyyy")]
    Malformed(String),
    #[error("'{0}' is not a calendar date")]
    NotADate(String),
}

/// Parse a deadline strictly: `25-12-2025` is accepted, `25-12-25`,
/// `5-1-2025` and `31-02-2025` are not.
pub fn parse_deadline(text: &str) -> Result<NaiveDate, DateError> {
    if !DEADLINE_SHAPE.is_match(text) {
        return Err(DateError::Malformed(text.to_string()));
    }
    NaiveDate::parse_from_str(text, DEADLINE_FORMAT).map_err(|_| DateError::NotADate(text.to_string()))
}

/// Format a deadline as `dd-MM-yyyy`
pub fn format_deadline(date: NaiveDate) -> String {
    date.format(DEADLINE_FORMAT).to_string()
}
