//! Normalizers that reduce scraped free text to integers.

use crate::error::Result;
use crate::utils::{parse_digits, string_values};
use polars::prelude::*;

/// Scraped bedroom counts sometimes hold a link to the listing page.
const HTML_ARTIFACT: &str = ".html";

/// Bedroom count: `0` for scraper artifacts, otherwise the digits.
pub(crate) fn bedrooms(value: &str) -> Option<i64> {
    if value.contains(HTML_ARTIFACT) {
        Some(0)
    } else {
        parse_digits(value)
    }
}

/// Floor level: keywords for the ground and top floors, otherwise the digits.
pub(crate) fn level(value: &str, ground: &str, top: &str, top_level: i64) -> Option<i64> {
    if value.contains(ground) {
        Some(0)
    } else if value.contains(top) {
        Some(top_level)
    } else {
        parse_digits(value)
    }
}

/// Replace `column` with an `Int64` column produced by `normalize`.
///
/// Returns the number of non-null values written.
pub(crate) fn normalize_column<F>(df: &mut DataFrame, column: &str, normalize: F) -> Result<usize>
where
    F: Fn(&str) -> Option<i64>,
{
    let values = string_values(df, column)?;
    let normalized: Vec<Option<i64>> = values
        .iter()
        .map(|value| value.as_deref().and_then(|v| normalize(v)))
        .collect();

    let parsed = normalized.iter().filter(|v| v.is_some()).count();
    df.with_column(Series::new(column.into(), normalized))?;
    Ok(parsed)
}
