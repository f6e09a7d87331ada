use crate::location::{
    CityGovernorateIndex, RegionClassifier, ResolvedLocations, UNRESOLVED_CITY,
};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Output of a full pipeline run.
#[derive(Debug, Clone)]
pub struct CleaningResult {
    /// The cleaned listings.
    pub data: DataFrame,
    /// What the pipeline did to get there.
    pub summary: CleaningSummary,
}

// ============================================================================
// Cleaning Summary Types
// ============================================================================

/// Human-readable summary of what the pipeline did.
///
/// Serialized as JSON by the CLI (`--json` / `--emit-report`).
///
/// # Example
///
/// ```rust,ignore
/// let summary = result.summary;
/// println!("Cleaned {} rows in {}ms", summary.rows, summary.duration_ms);
/// if let Some(location) = &summary.location {
///     println!("{} unresolved cities", location.unresolved_cities.len());
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows processed. The pipeline never adds or removes rows.
    pub rows: usize,

    /// Number of columns before cleaning.
    pub columns_before: usize,
    /// Number of columns after cleaning.
    pub columns_after: usize,

    /// Steps that ran, in order.
    pub steps_applied: Vec<String>,

    /// Steps that were disabled or could not run.
    pub steps_skipped: Vec<String>,

    /// List of actions taken during cleaning.
    pub actions: Vec<CleaningAction>,

    /// Warnings and notes generated during cleaning.
    pub warnings: Vec<String>,

    /// Outcome of location resolution, when that step ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSummary>,
}

impl CleaningSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the summary.
    pub fn add_action(&mut self, action: CleaningAction) {
        self.actions.push(action);
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Number of columns the pipeline added (negative when columns were dropped).
    pub fn columns_added(&self) -> isize {
        self.columns_after as isize - self.columns_before as isize
    }
}

/// A single action taken during cleaning.
///
/// Actions form an audit trail of what was done to each column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningAction {
    /// Type of action performed.
    pub action_type: ActionType,
    /// Column the action targeted.
    pub target: String,
    /// Human-readable description of the action.
    pub description: String,
    /// Additional details (e.g., counts before and after).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CleaningAction {
    /// Create a new cleaning action.
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            details: None,
        }
    }

    /// Add details to the action.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Types of actions that can be taken during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// City, governorate and region were derived from the raw location.
    LocationResolved,
    /// Free text was reduced to an integer.
    ValuesNormalized,
    /// A flag or label was extracted from listing text.
    FeatureExtracted,
    /// A date was split into calendar parts.
    DateDecomposed,
    /// Missing values were replaced with a placeholder.
    ValuesFilled,
    /// Categories were one-hot encoded and the source column dropped.
    CategoriesEncoded,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LocationResolved => "Location Resolved",
            Self::ValuesNormalized => "Values Normalized",
            Self::FeatureExtracted => "Feature Extracted",
            Self::DateDecomposed => "Date Decomposed",
            Self::ValuesFilled => "Values Filled",
            Self::CategoriesEncoded => "Categories Encoded",
        }
    }
}

/// Outcome of resolving one batch of locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSummary {
    /// Rows whose location was missing.
    pub missing_locations: usize,
    /// Distinct city tokens in the batch index.
    pub indexed_cities: usize,
    /// City tokens no row paired with a governorate, sorted.
    pub unresolved_cities: Vec<String>,
    /// Governorates with no region (including the unresolved sentinel), sorted.
    pub unknown_governorates: Vec<String>,
    /// Row count per region label; `"nan"` counts unclassified rows.
    pub region_counts: BTreeMap<String, usize>,
}

impl LocationSummary {
    /// Summarize a batch from its index and resolved columns.
    pub fn from_resolution(index: &CityGovernorateIndex, resolved: &ResolvedLocations) -> Self {
        let missing_locations = resolved.cities.iter().filter(|c| c.is_none()).count();

        let unknown_governorates: BTreeSet<&str> = resolved
            .governorates
            .iter()
            .zip(&resolved.regions)
            .filter_map(|(governorate, region)| match (governorate, region) {
                (Some(governorate), None) => Some(governorate.as_str()),
                _ => None,
            })
            .collect();

        let mut region_counts = BTreeMap::new();
        for region in &resolved.regions {
            *region_counts
                .entry(RegionClassifier::label(*region).to_string())
                .or_insert(0) += 1;
        }

        Self {
            missing_locations,
            indexed_cities: index.len(),
            unresolved_cities: index
                .unresolved_cities()
                .into_iter()
                .map(str::to_string)
                .collect(),
            unknown_governorates: unknown_governorates
                .into_iter()
                .map(str::to_string)
                .collect(),
            region_counts,
        }
    }

    /// Whether any city fell back to the unresolved sentinel.
    pub fn has_unresolved(&self) -> bool {
        !self.unresolved_cities.is_empty()
            || self
                .unknown_governorates
                .iter()
                .any(|g| g == UNRESOLVED_CITY)
    }
}

// ============================================================================
// Tests
// ============================================================================
