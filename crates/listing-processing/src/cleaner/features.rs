//! Flags and labels extracted from listing text.

use crate::config::ColumnNames;
use crate::error::Result;
use crate::utils::{contains_any_keyword, has_column, string_values};
use polars::prelude::*;

/// Placeholder for a missing categorical value.
pub const NOT_AVAILABLE: &str = "Not Available";

/// Compound label for listings whose text mentions a compound.
pub const COMPOUND_SPECIFIED: &str = "compound name is specified";

/// Furnished column value scraped from the listing's own field.
const FURNISHED_YES: &str = "Yes";

/// Description and title of each row, joined by a space.
///
/// Whichever of the two columns exist are used; with neither, every row's
/// text is empty.
pub(crate) fn listing_text(df: &DataFrame, columns: &ColumnNames) -> Result<Vec<String>> {
    let mut sources = Vec::new();
    for name in [&columns.description, &columns.title] {
        if has_column(df, name) {
            sources.push(string_values(df, name)?);
        }
    }

    let texts = (0..df.height())
        .map(|row| {
            sources
                .iter()
                .filter_map(|values| values[row].as_deref())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    Ok(texts)
}

/// Counts of furnished rows before and after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FurnishedCounts {
    pub before: usize,
    pub after: usize,
}

/// Replace `furnished` with a Boolean: `"Yes"` or a keyword in the text.
pub(crate) fn extract_furnished(
    df: &mut DataFrame,
    columns: &ColumnNames,
    keywords: &[String],
) -> Result<FurnishedCounts> {
    let furnished = string_values(df, &columns.furnished)?;
    let texts = listing_text(df, columns)?;

    let before = furnished
        .iter()
        .filter(|value| value.as_deref() == Some(FURNISHED_YES))
        .count();

    let flags: Vec<bool> = furnished
        .iter()
        .zip(&texts)
        .map(|(value, text)| {
            value.as_deref() == Some(FURNISHED_YES) || contains_any_keyword(text, keywords)
        })
        .collect();
    let after = flags.iter().filter(|flag| **flag).count();

    df.with_column(Series::new(columns.furnished.as_str().into(), flags))?;
    Ok(FurnishedCounts { before, after })
}

/// Fill missing `compound` values and label compounds mentioned in the text.
///
/// Returns the number of rows labelled [`COMPOUND_SPECIFIED`].
pub(crate) fn extract_compound(
    df: &mut DataFrame,
    columns: &ColumnNames,
    keywords: &[String],
) -> Result<usize> {
    let compound = string_values(df, &columns.compound)?;
    let texts = listing_text(df, columns)?;

    let labels: Vec<String> = compound
        .into_iter()
        .zip(&texts)
        .map(|(value, text)| {
            let value = value.unwrap_or_else(|| NOT_AVAILABLE.to_string());
            if value == NOT_AVAILABLE && contains_any_keyword(text, keywords) {
                COMPOUND_SPECIFIED.to_string()
            } else {
                value
            }
        })
        .collect();
    let specified = labels.iter().filter(|l| *l == COMPOUND_SPECIFIED).count();

    df.with_column(Series::new(columns.compound.as_str().into(), labels))?;
    Ok(specified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_COMPOUND_KEYWORDS, DEFAULT_FURNISHED_KEYWORDS};
    use crate::utils::count_true;
    use pretty_assertions::assert_eq;

    fn keywords(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_listing_text_joins_present_columns() {
        let df = df!(
            "description" => &[Some("Sunny flat"), None],
            "title" => &[Some("Maadi"), Some("Zamalek")]
        )
        .unwrap();

        let texts = listing_text(&df, &ColumnNames::default()).unwrap();
        assert_eq!(texts, vec!["Sunny flat Maadi", "Zamalek"]);
    }

    #[test]
    fn test_listing_text_without_text_columns() {
        let df = df!("id" => &["1", "2"]).unwrap();
        let texts = listing_text(&df, &ColumnNames::default()).unwrap();
        assert_eq!(texts, vec!["", ""]);
    }

    #[test]
    fn test_extract_furnished() {
        let mut df = df!(
            "furnished" => &[Some("Yes"), Some("No"), None, Some("No"), Some("No")],
            "description" => &[
                "Nice view",
                "Fully Furnished apartment",
                "شقة مفروشة",
                "Empty unit",
                "Unfurnished",
            ],
            "title" => &["A", "B", "C", "D", "E"]
        )
        .unwrap();

        let counts = extract_furnished(
            &mut df,
            &ColumnNames::default(),
            &keywords(&DEFAULT_FURNISHED_KEYWORDS),
        )
        .unwrap();

        assert_eq!(counts, FurnishedCounts { before: 1, after: 4 });
        assert_eq!(df.column("furnished").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(count_true(&df, "furnished").unwrap(), 4);
    }

    #[test]
    fn test_extract_compound() {
        let mut df = df!(
            "compound" => &[Some("Mivida"), None, None, Some("Not Available")],
            "description" => &["", "Inside a gated compound", "Street view", "كمبوند هادئ"]
        )
        .unwrap();

        let specified = extract_compound(
            &mut df,
            &ColumnNames::default(),
            &keywords(&DEFAULT_COMPOUND_KEYWORDS),
        )
        .unwrap();

        assert_eq!(specified, 2);
        assert_eq!(
            string_values(&df, "compound").unwrap(),
            vec![
                Some("Mivida".to_string()),
                Some(COMPOUND_SPECIFIED.to_string()),
                Some(NOT_AVAILABLE.to_string()),
                Some(COMPOUND_SPECIFIED.to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_compound_keeps_named_compound() {
        let mut df = df!(
            "compound" => &["Palm Hills"],
            "title" => &["Apartment in compound"]
        )
        .unwrap();

        let specified =
            extract_compound(&mut df, &ColumnNames::default(), &keywords(&["compound"])).unwrap();

        assert_eq!(specified, 0);
        assert_eq!(
            string_values(&df, "compound").unwrap(),
            vec![Some("Palm Hills".to_string())]
        );
    }
}
