//! Configuration types for the listing cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. Every setting has a default
//! matching the column layout produced by the listings scraper.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Amenities one-hot encoded by default.
pub const DEFAULT_AMENITIES: [&str; 14] = [
    "Balcony",
    "Built in Kitchen Appliances",
    "Private Garden",
    "Central A/C & heating",
    "Security",
    "Covered Parking",
    "Maids Room",
    "Pets Allowed",
    "Pool",
    "Electricity Meter",
    "Water Meter",
    "Natural Gas",
    "Landline",
    "Elevator",
];

/// Keywords marking a listing as furnished (matched case-insensitively).
pub const DEFAULT_FURNISHED_KEYWORDS: [&str; 3] = ["furnished", "فرش", "روش"];

/// Keywords marking a listing as part of a compound (matched case-insensitively).
pub const DEFAULT_COMPOUND_KEYWORDS: [&str; 2] = ["compound", "وند"];

/// Names of the raw and derived columns the pipeline reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Raw free-text location. Default: "location"
    pub location: String,
    /// Derived city. Default: "city"
    pub city: String,
    /// Derived governorate. Default: "governorate"
    pub governorate: String,
    /// Derived region. Default: "region"
    pub region: String,
    pub bedrooms: String,
    pub bathrooms: String,
    /// Floor level. Default: "level"
    pub level: String,
    pub area: String,
    pub description: String,
    pub title: String,
    pub furnished: String,
    pub compound: String,
    pub date: String,
    pub delivery_date: String,
    /// Raw amenities list. Default: "amenties" (spelling used by the scraper)
    pub amenities: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            location: "location".to_string(),
            city: "city".to_string(),
            governorate: "governorate".to_string(),
            region: "region".to_string(),
            bedrooms: "bedrooms".to_string(),
            bathrooms: "bathrooms".to_string(),
            level: "level".to_string(),
            area: "area".to_string(),
            description: "description".to_string(),
            title: "title".to_string(),
            furnished: "furnished".to_string(),
            compound: "compound".to_string(),
            date: "date".to_string(),
            delivery_date: "delivery_date".to_string(),
            amenities: "amenties".to_string(),
        }
    }
}

impl ColumnNames {
    fn named_fields(&self) -> [(&'static str, &str); 15] {
        [
            ("location", self.location.as_str()),
            ("city", self.city.as_str()),
            ("governorate", self.governorate.as_str()),
            ("region", self.region.as_str()),
            ("bedrooms", self.bedrooms.as_str()),
            ("bathrooms", self.bathrooms.as_str()),
            ("level", self.level.as_str()),
            ("area", self.area.as_str()),
            ("description", self.description.as_str()),
            ("title", self.title.as_str()),
            ("furnished", self.furnished.as_str()),
            ("compound", self.compound.as_str()),
            ("date", self.date.as_str()),
            ("delivery_date", self.delivery_date.as_str()),
            ("amenities", self.amenities.as_str()),
        ]
    }
}

/// Configuration for the cleaning pipeline.
///
/// Use [`CleanerConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use listing_processing::config::CleanerConfig;
///
/// let config = CleanerConfig::builder()
///     .location_column("address")
///     .encode_amenities(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Column names read and written by each step.
    pub columns: ColumnNames,

    /// Amenities to one-hot encode (substring match on the raw amenities value).
    pub amenities: Vec<String>,

    /// Keywords in title/description that mark a listing as furnished.
    pub furnished_keywords: Vec<String>,

    /// Keywords in title/description that mark a listing as part of a compound.
    pub compound_keywords: Vec<String>,

    /// Level text mapped to floor 0.
    /// Default: "Ground"
    pub ground_floor_keyword: String,

    /// Level text mapped to [`top_floor_level`](Self::top_floor_level).
    /// Default: "Highest"
    pub top_floor_keyword: String,

    /// Numeric level assigned to the top floor keyword.
    /// Default: 10
    pub top_floor_level: i64,

    /// Derive city, governorate and region from the location column.
    /// Default: true
    pub clean_location: bool,

    /// Normalize bedrooms, bathrooms, level and area.
    /// Default: true
    pub clean_numeric: bool,

    /// Extract furnished/compound flags from free text.
    /// Default: true
    pub extract_features: bool,

    /// Decompose the listing date and flag delivery dates.
    /// Default: true
    pub clean_dates: bool,

    /// One-hot encode amenities.
    /// Default: true
    pub encode_amenities: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            amenities: to_strings(&DEFAULT_AMENITIES),
            furnished_keywords: to_strings(&DEFAULT_FURNISHED_KEYWORDS),
            compound_keywords: to_strings(&DEFAULT_COMPOUND_KEYWORDS),
            ground_floor_keyword: "Ground".to_string(),
            top_floor_keyword: "Highest".to_string(),
            top_floor_level: 10,
            clean_location: true,
            clean_numeric: true,
            extract_features: true,
            clean_dates: true,
            encode_amenities: true,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl CleanerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleanerConfigBuilder {
        CleanerConfigBuilder::default()
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: CleanerConfig = serde_json::from_str(json)?;
        config
            .validate()
            .map_err(|e| crate::error::ProcessingError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, name) in self.columns.named_fields() {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
            }
        }

        let mut outputs = HashSet::new();
        for name in [
            &self.columns.city,
            &self.columns.governorate,
            &self.columns.region,
        ] {
            if !outputs.insert(name.as_str()) {
                return Err(ConfigValidationError::DuplicateOutputColumn(name.clone()));
            }
        }

        if self.amenities.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyKeyword("amenities".to_string()));
        }
        if self.furnished_keywords.iter().any(|k| k.is_empty()) {
            return Err(ConfigValidationError::EmptyKeyword(
                "furnished_keywords".to_string(),
            ));
        }
        if self.compound_keywords.iter().any(|k| k.is_empty()) {
            return Err(ConfigValidationError::EmptyKeyword(
                "compound_keywords".to_string(),
            ));
        }
        if self.ground_floor_keyword.is_empty() || self.top_floor_keyword.is_empty() {
            return Err(ConfigValidationError::EmptyKeyword("level keywords".to_string()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("Output column '{0}' is used more than once (city, governorate and region must differ)")]
    DuplicateOutputColumn(String),

    #[error("'{0}' contains an empty entry")]
    EmptyKeyword(String),
}

/// Builder for [`CleanerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleanerConfigBuilder {
    columns: Option<ColumnNames>,
    location_column: Option<String>,
    amenities: Option<Vec<String>>,
    furnished_keywords: Option<Vec<String>>,
    compound_keywords: Option<Vec<String>>,
    top_floor_level: Option<i64>,
    clean_location: Option<bool>,
    clean_numeric: Option<bool>,
    extract_features: Option<bool>,
    clean_dates: Option<bool>,
    encode_amenities: Option<bool>,
}

impl CleanerConfigBuilder {
    /// Replace every column name at once.
    pub fn columns(mut self, columns: ColumnNames) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Set the raw location column, keeping the other column names.
    pub fn location_column(mut self, name: impl Into<String>) -> Self {
        self.location_column = Some(name.into());
        self
    }

    /// Set the amenities to one-hot encode.
    pub fn amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = Some(amenities.into_iter().map(Into::into).collect());
        self
    }

    pub fn furnished_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.furnished_keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    pub fn compound_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compound_keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Set the level assigned to the top floor keyword.
    pub fn top_floor_level(mut self, level: i64) -> Self {
        self.top_floor_level = Some(level);
        self
    }

    /// Enable or disable location resolution.
    pub fn clean_location(mut self, enable: bool) -> Self {
        self.clean_location = Some(enable);
        self
    }

    /// Enable or disable the numeric normalizers.
    pub fn clean_numeric(mut self, enable: bool) -> Self {
        self.clean_numeric = Some(enable);
        self
    }

    /// Enable or disable furnished/compound extraction.
    pub fn extract_features(mut self, enable: bool) -> Self {
        self.extract_features = Some(enable);
        self
    }

    /// Enable or disable date decomposition and delivery flags.
    pub fn clean_dates(mut self, enable: bool) -> Self {
        self.clean_dates = Some(enable);
        self
    }

    /// Enable or disable amenities encoding.
    pub fn encode_amenities(mut self, enable: bool) -> Self {
        self.encode_amenities = Some(enable);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleanerConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleanerConfig, ConfigValidationError> {
        let defaults = CleanerConfig::default();

        let mut columns = self.columns.unwrap_or_default();
        if let Some(location) = self.location_column {
            columns.location = location;
        }

        let config = CleanerConfig {
            columns,
            amenities: self.amenities.unwrap_or(defaults.amenities),
            furnished_keywords: self.furnished_keywords.unwrap_or(defaults.furnished_keywords),
            compound_keywords: self.compound_keywords.unwrap_or(defaults.compound_keywords),
            ground_floor_keyword: defaults.ground_floor_keyword,
            top_floor_keyword: defaults.top_floor_keyword,
            top_floor_level: self.top_floor_level.unwrap_or(defaults.top_floor_level),
            clean_location: self.clean_location.unwrap_or(true),
            clean_numeric: self.clean_numeric.unwrap_or(true),
            extract_features: self.extract_features.unwrap_or(true),
            clean_dates: self.clean_dates.unwrap_or(true),
            encode_amenities: self.encode_amenities.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
