//! Per-row resolution of city, governorate and region.

use super::{
    CityGovernorateIndex, DiagnosticSink, GovernorateIndexBuilder, Region, RegionClassifier,
    city_token,
};
use crate::error::{ProcessingError, Result};
use serde::Serialize;

/// The three derived columns, one entry per input row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedLocations {
    /// `None` where the location was missing.
    pub cities: Vec<Option<String>>,
    /// `None` where the location was missing; may hold the unresolved sentinel.
    pub governorates: Vec<Option<String>>,
    /// `None` where the region is unknown or the location was missing.
    pub regions: Vec<Option<Region>>,
}

impl ResolvedLocations {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            cities: Vec::with_capacity(capacity),
            governorates: Vec::with_capacity(capacity),
            regions: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Region column values, with `"nan"` for unclassified rows.
    pub fn region_labels(&self) -> Vec<&'static str> {
        self.regions
            .iter()
            .map(|region| RegionClassifier::label(*region))
            .collect()
    }
}

/// Applies a [`CityGovernorateIndex`] to a location column.
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve every row against a prebuilt index.
    ///
    /// Output has the same length and order as `locations`. A city token
    /// missing from the index fails the whole batch with
    /// [`ProcessingError::IndexInvariantViolation`]; that only happens when
    /// `index` was not built from `locations`.
    pub fn resolve(
        locations: &[Option<&str>],
        index: &CityGovernorateIndex,
        sink: &dyn DiagnosticSink,
    ) -> Result<ResolvedLocations> {
        let mut resolved = ResolvedLocations::with_capacity(locations.len());

        for location in locations {
            let (city, governorate) = match location {
                None => (None, None),
                Some(value) => {
                    let token = city_token(value);
                    let governorate = index.get(token).ok_or_else(|| {
                        ProcessingError::IndexInvariantViolation {
                            token: token.to_string(),
                        }
                    })?;
                    (Some(token.to_string()), Some(governorate.to_string()))
                }
            };

            resolved
                .regions
                .push(RegionClassifier::classify(governorate.as_deref(), sink));
            resolved.cities.push(city);
            resolved.governorates.push(governorate);
        }

        Ok(resolved)
    }

    /// Build the index from `locations`, then resolve `locations` against it.
    pub fn resolve_batch(
        locations: &[Option<&str>],
        sink: &dyn DiagnosticSink,
    ) -> Result<(CityGovernorateIndex, ResolvedLocations)> {
        let index = GovernorateIndexBuilder::build(locations, sink);
        let resolved = Self::resolve(locations, &index, sink)?;
        Ok((index, resolved))
    }
}
