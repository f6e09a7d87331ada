//! Listing date decomposition and delivery date flags.

use super::features::NOT_AVAILABLE;
use crate::error::{ProcessingError, Result};
use crate::utils::string_values;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Calendar year of the listing date.
pub const YEAR_COLUMN: &str = "year";
/// Full English month name of the listing date.
pub const MONTH_COLUMN: &str = "month";
/// Full English weekday name of the listing date.
pub const WEEKDAY_COLUMN: &str = "weekday";

// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

// Slash dates read month first; day first only when that fails
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a listing date in any of the formats the scraper has produced.
pub fn parse_listing_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
}

/// Replace `column` with a `Date` column and add year, month and weekday.
///
/// Returns the number of dates that parsed.
pub(crate) fn decompose_date(df: &mut DataFrame, column: &str) -> Result<usize> {
    let dates: Vec<Option<NaiveDate>> = string_values(df, column)?
        .iter()
        .map(|value| value.as_deref().and_then(parse_listing_date))
        .collect();
    let parsed = dates.iter().filter(|d| d.is_some()).count();

    let days: Vec<Option<i32>> = dates
        .iter()
        .map(|date| date.map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
        .collect();
    let years: Vec<Option<i32>> = dates.iter().map(|date| date.map(|d| d.year())).collect();
    let months: Vec<Option<String>> = dates
        .iter()
        .map(|date| date.map(|d| d.format("%B").to_string()))
        .collect();
    let weekdays: Vec<Option<String>> = dates
        .iter()
        .map(|date| date.map(|d| d.format("%A").to_string()))
        .collect();

    let date_series = Series::new(column.into(), days)
        .cast(&DataType::Date)
        .map_err(|e| ProcessingError::TransformFailed {
            column: column.to_string(),
            reason: e.to_string(),
        })?;
    df.with_column(date_series)?;
    df.with_column(Series::new(YEAR_COLUMN.into(), years))?;
    df.with_column(Series::new(MONTH_COLUMN.into(), months))?;
    df.with_column(Series::new(WEEKDAY_COLUMN.into(), weekdays))?;

    Ok(parsed)
}

/// Name of the flag column added next to a delivery date column.
pub fn delivery_flag_column(column: &str) -> String {
    format!("{column}_specified")
}

/// Add `<column>_specified` and fill missing delivery dates.
///
/// Returns the number of rows with a delivery date.
pub(crate) fn flag_delivery_date(df: &mut DataFrame, column: &str) -> Result<usize> {
    let values = string_values(df, column)?;

    let specified: Vec<bool> = values
        .iter()
        .map(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
        .collect();
    let count = specified.iter().filter(|flag| **flag).count();

    let filled: Vec<String> = values
        .into_iter()
        .zip(&specified)
        .map(|(value, specified)| match value {
            Some(value) if *specified => value,
            _ => NOT_AVAILABLE.to_string(),
        })
        .collect();

    df.with_column(Series::new(column.into(), filled))?;
    df.with_column(Series::new(
        delivery_flag_column(column).as_str().into(),
        specified,
    ))?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::count_true;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_listing_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 14);
        assert_eq!(parse_listing_date("2023-05-14"), expected);
        assert_eq!(parse_listing_date("2023-05-14 18:30:00"), expected);
        assert_eq!(parse_listing_date("2023-05-14T18:30:00"), expected);
        assert_eq!(parse_listing_date("2023-05-14T18:30:00+02:00"), expected);
        assert_eq!(parse_listing_date("14/05/2023"), expected);
        assert_eq!(parse_listing_date("14-05-2023"), expected);
        assert_eq!(parse_listing_date("05/30/2023"), NaiveDate::from_ymd_opt(2023, 5, 30));
    }

    #[test]
    fn test_parse_listing_date_ambiguous_slash_is_month_first() {
        assert_eq!(
            parse_listing_date("05/06/2023"),
            NaiveDate::from_ymd_opt(2023, 5, 6)
        );
        assert_eq!(
            parse_listing_date("06/05/2023"),
            NaiveDate::from_ymd_opt(2023, 6, 5)
        );
    }

    #[test]
    fn test_decompose_ambiguous_slash_date() {
        let mut df = df!("date" => &["05/06/2023"]).unwrap();
        decompose_date(&mut df, "date").unwrap();

        assert_eq!(
            string_values(&df, MONTH_COLUMN).unwrap(),
            vec![Some("May".to_string())]
        );
        assert_eq!(
            string_values(&df, WEEKDAY_COLUMN).unwrap(),
            vec![Some("Saturday".to_string())]
        );
    }

    #[test]
    fn test_parse_listing_date_invalid() {
        assert_eq!(parse_listing_date(""), None);
        assert_eq!(parse_listing_date("yesterday"), None);
        assert_eq!(parse_listing_date("2023-13-45"), None);
    }

    #[test]
    fn test_decompose_date() {
        let mut df = df!("date" => &[Some("2023-05-14"), None, Some("not a date")]).unwrap();

        let parsed = decompose_date(&mut df, "date").unwrap();

        assert_eq!(parsed, 1);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        let years: Vec<Option<i32>> = df
            .column(YEAR_COLUMN)
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(years, vec![Some(2023), None, None]);
        assert_eq!(
            string_values(&df, MONTH_COLUMN).unwrap(),
            vec![Some("May".to_string()), None, None]
        );
        assert_eq!(
            string_values(&df, WEEKDAY_COLUMN).unwrap(),
            vec![Some("Sunday".to_string()), None, None]
        );
    }

    #[test]
    fn test_decompose_date_epoch() {
        let mut df = df!("date" => &["1970-01-02"]).unwrap();
        decompose_date(&mut df, "date").unwrap();

        let days = df
            .column("date")
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::Int32)
            .unwrap();
        assert_eq!(days.i32().unwrap().get(0), Some(1));
    }

    #[test]
    fn test_flag_delivery_date() {
        let mut df = df!("delivery_date" => &[Some("2025-12-01"), None, Some("  ")]).unwrap();

        let count = flag_delivery_date(&mut df, "delivery_date").unwrap();

        assert_eq!(count, 1);
        assert_eq!(count_true(&df, "delivery_date_specified").unwrap(), 1);
        assert_eq!(
            string_values(&df, "delivery_date").unwrap(),
            vec![
                Some("2025-12-01".to_string()),
                Some(NOT_AVAILABLE.to_string()),
                Some(NOT_AVAILABLE.to_string()),
            ]
        );
    }
}
