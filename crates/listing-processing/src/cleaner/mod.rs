//! Column cleaning for scraped property listings.
//!
//! This module provides functionality for:
//! - Deriving city, governorate and region from the raw location
//! - Reducing bedrooms, bathrooms, level and area to integers
//! - Extracting furnished and compound features from listing text
//! - Decomposing listing dates and flagging delivery dates
//! - One-hot encoding amenities

mod amenities;
mod dates;
mod features;
mod location;
mod numeric;

pub use amenities::amenities_flag_column;
pub use dates::{
    MONTH_COLUMN, WEEKDAY_COLUMN, YEAR_COLUMN, delivery_flag_column, parse_listing_date,
};
pub use features::{COMPOUND_SPECIFIED, NOT_AVAILABLE};

use crate::config::CleanerConfig;
use crate::error::Result;
use crate::location::{DiagnosticSink, TracingSink};
use crate::types::{ActionType, CleaningAction, LocationSummary};
use crate::utils::parse_digits;
use polars::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Applies the cleaning transforms to a listings DataFrame.
///
/// Each method cleans one concern in place and returns the action it took.
/// A missing source column is reported as
/// [`ProcessingError::ColumnNotFound`](crate::ProcessingError::ColumnNotFound).
pub struct ListingCleaner {
    config: CleanerConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl ListingCleaner {
    /// Create a cleaner that reports location diagnostics through `tracing`.
    pub fn new(config: CleanerConfig) -> Self {
        Self::with_diagnostics(config, Arc::new(TracingSink))
    }

    /// Create a cleaner with a custom diagnostic sink.
    pub fn with_diagnostics(config: CleanerConfig, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            config,
            diagnostics,
        }
    }

    /// The configuration this cleaner applies.
    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Derive city, governorate and region from the location column.
    pub fn clean_location(&self, df: &mut DataFrame) -> Result<(CleaningAction, LocationSummary)> {
        info!("Resolving locations...");
        let columns = &self.config.columns;
        let summary = location::clean_location(df, columns, self.diagnostics.as_ref())?;

        let action = CleaningAction::new(
            ActionType::LocationResolved,
            columns.location.as_str(),
            format!(
                "Derived '{}', '{}' and '{}' for {} rows",
                columns.city,
                columns.governorate,
                columns.region,
                df.height()
            ),
        )
        .with_details(format!(
            "{} cities indexed, {} unresolved, {} missing locations",
            summary.indexed_cities,
            summary.unresolved_cities.len(),
            summary.missing_locations
        ));

        Ok((action, summary))
    }

    /// Reduce bedroom counts to integers; scraper link artifacts become 0.
    pub fn clean_bedrooms(&self, df: &mut DataFrame) -> Result<CleaningAction> {
        let column = &self.config.columns.bedrooms;
        let parsed = numeric::normalize_column(df, column, numeric::bedrooms)?;
        Ok(normalized_action(column, parsed))
    }

    /// Reduce bathroom counts to integers.
    pub fn clean_bathrooms(&self, df: &mut DataFrame) -> Result<CleaningAction> {
        let column = &self.config.columns.bathrooms;
        let parsed = numeric::normalize_column(df, column, parse_digits)?;
        Ok(normalized_action(column, parsed))
    }

    /// Reduce floor levels to integers, mapping the ground and top floor keywords.
    pub fn clean_levels(&self, df: &mut DataFrame) -> Result<CleaningAction> {
        let config = &self.config;
        let column = &config.columns.level;
        let parsed = numeric::normalize_column(df, column, |value| {
            numeric::level(
                value,
                &config.ground_floor_keyword,
                &config.top_floor_keyword,
                config.top_floor_level,
            )
        })?;
        Ok(normalized_action(column, parsed))
    }

    /// Reduce areas to integers.
    pub fn clean_area(&self, df: &mut DataFrame) -> Result<CleaningAction> {
        let column = &self.config.columns.area;
        let parsed = numeric::normalize_column(df, column, parse_digits)?;
        Ok(normalized_action(column, parsed))
    }

    /// Turn the furnished column into a Boolean using the listing text.
    pub fn extract_furnished(&self, df: &mut DataFrame) -> Result<CleaningAction> {
        let columns = &self.config.columns;
        let counts =
            features::extract_furnished(df, columns, &self.config.furnished_keywords)?;

        info!("Number of furnished before extraction: {}", counts.before);
        info!("Number of furnished after extraction: {}", counts.after);

        Ok(CleaningAction::new(
            ActionType::FeatureExtracted,
            columns.furnished.as_str(),
            format!("Flagged {} furnished listings", counts.after),
        )
        .with_details(format!(
            "{} marked furnished before, {} after",
            counts.before, counts.after
        )))
    }

    /// Fill missing compounds and label compounds mentioned in the listing text.
    pub fn extract_compound(&self, df: &mut DataFrame) -> Result<CleaningAction> {
        let columns = &self.config.columns;
        let specified = features::extract_compound(df, columns, &self.config.compound_keywords)?;
        debug!("{} listings mention a compound", specified);

        Ok(CleaningAction::new(
            ActionType::FeatureExtracted,
            columns.compound.as_str(),
            format!(
                "Filled missing values with '{}', labelled {} rows '{}'",
                NOT_AVAILABLE, specified, COMPOUND_SPECIFIED
            ),
        ))
    }

    /// Parse the listing date and add year, month and weekday columns.
    pub fn clean_date(&self, df: &mut DataFrame) -> Result<CleaningAction> {
        let column = &self.config.columns.date;
        let parsed = dates::decompose_date(df, column)?;
        debug!("Parsed {} of {} listing dates", parsed, df.height());

        Ok(CleaningAction::new(
            ActionType::DateDecomposed,
            column.as_str(),
            format!(
                "Parsed {} dates into '{}', '{}' and '{}'",
                parsed, YEAR_COLUMN, MONTH_COLUMN, WEEKDAY_COLUMN
            ),
        ))
    }

    /// Flag rows with a delivery date and fill the rest.
    pub fn clean_delivery(&self, df: &mut DataFrame) -> Result<CleaningAction> {
        let column = &self.config.columns.delivery_date;
        let specified = dates::flag_delivery_date(df, column)?;

        Ok(CleaningAction::new(
            ActionType::ValuesFilled,
            column.as_str(),
            format!(
                "{} rows specify a delivery date, the rest set to '{}'",
                specified, NOT_AVAILABLE
            ),
        ))
    }

    /// One-hot encode amenities and drop the raw amenities column.
    pub fn clean_amenities(&self, df: &mut DataFrame) -> Result<CleaningAction> {
        let column = &self.config.columns.amenities;
        let specified = amenities::encode_amenities(df, column, &self.config.amenities)?;

        Ok(CleaningAction::new(
            ActionType::CategoriesEncoded,
            column.as_str(),
            format!(
                "Encoded {} amenities and dropped the source column",
                self.config.amenities.len()
            ),
        )
        .with_details(format!("{} rows list amenities", specified)))
    }
}

fn normalized_action(column: &str, parsed: usize) -> CleaningAction {
    debug!("Extracted {} integers from '{}'", parsed, column);
    CleaningAction::new(
        ActionType::ValuesNormalized,
        column,
        format!("Extracted integers from {} values", parsed),
    )
}
