//! Shared utilities for the cleaning pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::error::{ProcessingError, Result};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Check whether a DataFrame has a column with this name.
#[inline]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Read a column as strings, casting when the CSV reader inferred another type.
pub fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series();

    let series = if series.dtype() == &DataType::String {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };

    Ok(series.str()?.clone())
}

/// Read a column as a vector of optional owned strings.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = string_column(df, name)?;
    Ok(column
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Count `true` values in a boolean column, treating nulls as false.
pub fn count_true(df: &DataFrame, name: &str) -> Result<usize> {
    let column = df
        .column(name)
        .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))?;
    let values = column.as_materialized_series().bool()?;
    Ok(values.into_iter().filter(|v| *v == Some(true)).count())
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

// Anything that is not an ASCII digit - compiled once at startup
static NON_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9]").expect("Invalid regex: non-digits"));

/// Map Arabic-Indic (U+0660..U+0669) and Extended Arabic-Indic
/// (U+06F0..U+06F9) digits to their ASCII counterparts.
fn to_ascii_digit(c: char) -> char {
    match c {
        '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
        '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
        _ => c,
    }
}

/// Keep only the digits of a string, as ASCII.
///
/// Arabic-Indic digits are converted; other scripts' digits and symbols
/// such as `²` are dropped.
///
/// # Example
///
/// ```rust,ignore
/// use listing_processing::utils::filter_digits;
///
/// assert_eq!(filter_digits("3 Bedrooms"), "3");
/// assert_eq!(filter_digits("1,250 m²"), "1250");
/// assert_eq!(filter_digits("١٢٠ متر"), "120");
/// ```
pub fn filter_digits(value: &str) -> String {
    let ascii: String = value.chars().map(to_ascii_digit).collect();
    NON_DIGITS.replace_all(&ascii, "").into_owned()
}

/// Extract the digits of a string and parse them as an integer.
///
/// Returns `None` when there are no digits or the number overflows `i64`.
pub fn parse_digits(value: &str) -> Option<i64> {
    let digits = filter_digits(value);
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok()
}

/// Check whether `text` contains any keyword, ignoring case.
pub fn contains_any_keyword(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}
