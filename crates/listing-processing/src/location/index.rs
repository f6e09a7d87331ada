//! City → governorate index built from the batch being cleaned.

use super::{Diagnostic, DiagnosticSink, UNRESOLVED_CITY, split_location};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Mapping from trimmed city token to trimmed governorate.
///
/// Every city token seen while building has an entry; tokens that never
/// appeared in a `"city, governorate"` location map to [`UNRESOLVED_CITY`].
/// Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityGovernorateIndex {
    entries: HashMap<String, String>,
}

impl CityGovernorateIndex {
    /// Governorate recorded for `city` (exact match).
    pub fn get(&self, city: &str) -> Option<&str> {
        self.entries.get(city).map(String::as_str)
    }

    pub fn contains(&self, city: &str) -> bool {
        self.entries.contains_key(city)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// City tokens mapped to the sentinel, sorted.
    pub fn unresolved_cities(&self) -> Vec<&str> {
        let mut cities: Vec<&str> = self
            .iter()
            .filter(|(_, governorate)| *governorate == UNRESOLVED_CITY)
            .map(|(city, _)| city)
            .collect();
        cities.sort_unstable();
        cities
    }
}

impl FromIterator<(String, String)> for CityGovernorateIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// Sorted keys keep JSON dumps stable between runs.
impl Serialize for CityGovernorateIndex {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let sorted: BTreeMap<&str, &str> = self.iter().collect();
        sorted.serialize(serializer)
    }
}

/// Builds a [`CityGovernorateIndex`] in a single scan over a location column.
pub struct GovernorateIndexBuilder;

impl GovernorateIndexBuilder {
    /// Build the index from every location in the batch.
    ///
    /// Values are deduplicated in order of first appearance. A value that
    /// splits into exactly two parts records `city -> governorate`; any other
    /// value defers its city token. Deferred tokens still absent once the scan
    /// is complete map to [`UNRESOLVED_CITY`], each with one
    /// [`Diagnostic::UnresolvedCity`]. A two-part entry anywhere in the batch
    /// therefore resolves a bare token regardless of row order.
    pub fn build(locations: &[Option<&str>], sink: &dyn DiagnosticSink) -> CityGovernorateIndex {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut entries: HashMap<String, String> = HashMap::new();
        let mut deferred: Vec<&str> = Vec::new();

        for location in locations.iter().flatten().copied() {
            if !seen.insert(location) {
                continue;
            }

            let parts = split_location(location);
            match parts.as_slice() {
                [city, governorate] => {
                    let city = city.trim();
                    let governorate = governorate.trim();
                    if let Some(previous) = entries.insert(city.to_string(), governorate.to_string())
                        && previous != governorate
                    {
                        sink.emit(Diagnostic::ConflictingGovernorate {
                            city: city.to_string(),
                            previous,
                            current: governorate.to_string(),
                        });
                    }
                }
                _ => {
                    if let Some(&token) = parts.first() {
                        deferred.push(token.trim());
                    }
                }
            }
        }

        let resolved = entries.len();
        for token in deferred {
            if !entries.contains_key(token) {
                sink.emit(Diagnostic::UnresolvedCity {
                    token: token.to_string(),
                });
                entries.insert(token.to_string(), UNRESOLVED_CITY.to_string());
            }
        }

        debug!(
            "Governorate index: {} unique locations, {} resolved cities, {} unresolved",
            seen.len(),
            resolved,
            entries.len() - resolved
        );

        CityGovernorateIndex { entries }
    }
}
