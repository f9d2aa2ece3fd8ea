//! Cell validators for the supported column types
//!
//! Each validator is a pure function from a raw cell string (plus resolved
//! parameters) to a typed value or a human-readable failure reason. The row
//! engine attaches row and column coordinates to the reason.
//!
//! Blank cells get no special treatment: a type whose parser rejects the
//! empty string (integer, float, date, boolean) fails on it, while the string
//! type passes it through as an empty text value.

use crate::app::models::CellValue;
use chrono::NaiveDate;

/// Validate a string cell: the raw value is passed through verbatim,
/// untrimmed, including the empty string for blank cells
pub fn validate_text(raw: &str) -> CellValue {
    CellValue::Text(raw.to_string())
}

/// Validate an integer cell as a base-10 signed integer
///
/// Only digits with an optional leading sign are accepted; the empty cell
/// fails.
pub fn validate_integer(raw: &str) -> Result<CellValue, String> {
    raw.parse::<i64>()
        .map(CellValue::Integer)
        .map_err(|_| "is not a base-10 integer".to_string())
}

/// Validate a float cell
///
/// The configured thousands separator (if any) is stripped first; the
/// remaining text is parsed with `.` as the decimal separator. Locales that
/// group with `.` and mark decimals with `,` cannot be parsed implicitly;
/// the separator has to be disambiguated in the column definition.
pub fn validate_float(raw: &str, thousands_separator: Option<char>) -> Result<CellValue, String> {
    let stripped: String = match thousands_separator {
        Some(sep) => raw.chars().filter(|&c| c != sep).collect(),
        None => raw.to_string(),
    };
    stripped
        .parse::<f64>()
        .map(CellValue::Float)
        .map_err(|_| match thousands_separator {
            Some(sep) => format!(
                "is not a number with '.' as decimal separator (after stripping '{}')",
                sep
            ),
            None => "is not a number with '.' as decimal separator".to_string(),
        })
}

/// Validate a date cell against the configured input pattern
///
/// The cell must match the pattern exactly; trailing or missing characters
/// fail.
pub fn validate_date(raw: &str, in_fmt: &str) -> Result<CellValue, String> {
    NaiveDate::parse_from_str(raw, in_fmt)
        .map(CellValue::Date)
        .map_err(|_| format!("is not a date matching the format '{}'", in_fmt))
}

/// Validate a boolean cell against the configured token lists
///
/// The raw value is compared case-sensitively, first against the true tokens,
/// then against the false tokens.
pub fn validate_boolean(
    raw: &str,
    true_tokens: &[String],
    false_tokens: &[String],
) -> Result<CellValue, String> {
    if true_tokens.iter().any(|t| t == raw) {
        Ok(CellValue::Boolean(true))
    } else if false_tokens.iter().any(|t| t == raw) {
        Ok(CellValue::Boolean(false))
    } else {
        Err(format!(
            "matches neither the true tokens [{}] nor the false tokens [{}]",
            true_tokens.join(", "),
            false_tokens.join(", ")
        ))
    }
}
