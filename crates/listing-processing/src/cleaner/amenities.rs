//! One-hot encoding of the scraped amenities list.

use crate::error::Result;
use crate::utils::string_values;
use polars::prelude::*;

/// Name of the flag column marking rows that listed any amenities.
pub fn amenities_flag_column(column: &str) -> String {
    format!("{column}_specified")
}

/// Add `<column>_specified` and one `0/1` column per amenity, then drop `column`.
///
/// An amenity is present when its name is a substring of the row's raw value.
/// Returns how many rows listed any amenities.
pub(crate) fn encode_amenities(
    df: &mut DataFrame,
    column: &str,
    amenities: &[String],
) -> Result<usize> {
    let values = string_values(df, column)?;

    let specified: Vec<bool> = values
        .iter()
        .map(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
        .collect();
    let count = specified.iter().filter(|flag| **flag).count();
    df.with_column(Series::new(
        amenities_flag_column(column).as_str().into(),
        specified,
    ))?;

    for amenity in amenities {
        let encoded: Vec<i32> = values
            .iter()
            .map(|value| {
                value
                    .as_deref()
                    .is_some_and(|v| v.contains(amenity.as_str())) as i32
            })
            .collect();
        df.with_column(Series::new(amenity.as_str().into(), encoded))?;
    }

    df.drop_in_place(column)?;
    Ok(count)
}
