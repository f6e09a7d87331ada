//! Location column cleaning.

use crate::config::ColumnNames;
use crate::error::Result;
use crate::location::{DiagnosticSink, LocationResolver};
use crate::types::LocationSummary;
use crate::utils::string_values;
use polars::prelude::*;
use tracing::debug;

/// Derive `city`, `governorate` and `region` from the raw location column.
///
/// The raw column is kept. Existing columns with the output names are
/// replaced.
pub(crate) fn clean_location(
    df: &mut DataFrame,
    columns: &ColumnNames,
    sink: &dyn DiagnosticSink,
) -> Result<LocationSummary> {
    let raw = string_values(df, &columns.location)?;
    let locations: Vec<Option<&str>> = raw.iter().map(Option::as_deref).collect();

    let (index, resolved) = LocationResolver::resolve_batch(&locations, sink)?;
    let summary = LocationSummary::from_resolution(&index, &resolved);

    let regions = resolved.region_labels();
    df.with_column(Series::new(columns.city.as_str().into(), resolved.cities))?;
    df.with_column(Series::new(
        columns.governorate.as_str().into(),
        resolved.governorates,
    ))?;
    df.with_column(Series::new(columns.region.as_str().into(), regions))?;

    debug!(
        "Resolved {} locations ({} missing, {} unresolved cities)",
        locations.len(),
        summary.missing_locations,
        summary.unresolved_cities.len()
    );

    Ok(summary)
}
