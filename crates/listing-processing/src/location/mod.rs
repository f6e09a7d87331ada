//! Location resolution.
//!
//! Turns a free-text `location` column ("City, Governorate", a bare city, or
//! Arabic text using `،`) into three columns: `city`, `governorate` and
//! `region`. Resolution runs in two passes over the batch:
//!
//! 1. [`GovernorateIndexBuilder`] scans every value once and records which
//!    governorate each city belongs to. Cities that never appear with a
//!    governorate map to [`UNRESOLVED_CITY`].
//! 2. [`LocationResolver`] looks each row's city up in the finished index and
//!    classifies the governorate with [`RegionClassifier`].
//!
//! Because the index is complete before any row is resolved, a row holding
//! only `"Maadi"` picks up `"Cairo"` from a `"Maadi, Cairo"` row anywhere in
//! the batch.
//!
//! Unresolved cities and unknown governorates never fail a batch. They are
//! reported through a [`DiagnosticSink`].

mod diagnostics;
mod index;
mod region;
mod resolver;

pub use diagnostics::{ClosureSink, Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use index::{CityGovernorateIndex, GovernorateIndexBuilder};
pub use region::{Region, RegionClassifier};
pub use resolver::{LocationResolver, ResolvedLocations};

use once_cell::sync::Lazy;
use regex::Regex;

/// Governorate assigned to a city that no row pairs with a governorate.
pub const UNRESOLVED_CITY: &str = "error city";

/// Region label for a missing or unclassified governorate.
pub const UNKNOWN_REGION: &str = "nan";

// Latin comma or Arabic comma - compiled once at startup
static LOCATION_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",|،").expect("Invalid regex: location delimiter"));

/// Split a raw location on either delimiter. Always yields at least one part.
pub(crate) fn split_location(value: &str) -> Vec<&str> {
    LOCATION_DELIMITER.split(value).collect()
}

/// First delimiter-separated segment of a location, trimmed.
pub fn city_token(value: &str) -> &str {
    LOCATION_DELIMITER
        .split(value)
        .next()
        .unwrap_or(value)
        .trim()
}
