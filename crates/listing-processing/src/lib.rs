//! Listing Processing Library
//!
//! Cleans scraped Egyptian property listings with Rust and Polars.
//!
//! # Overview
//!
//! - **Location Resolution**: Derives `city`, `governorate` and `region` from a
//!   free-text location, filling in governorates for bare city names from other
//!   rows of the same batch
//! - **Numeric Normalization**: Reduces bedrooms, bathrooms, level and area to integers
//! - **Feature Extraction**: Furnished and compound flags from listing text
//! - **Date Cleaning**: Listing date decomposition and delivery date flags
//! - **Amenities Encoding**: One-hot columns for a configurable amenity list
//! - **Ingestion**: CSV reading and merging of scraper runs with deduplication
//! - **Progress Reporting**: Stage-by-stage progress updates
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use listing_processing::{CleanerConfig, Pipeline, read_listings_csv};
//!
//! let df = read_listings_csv("raw.csv")?;
//!
//! let result = Pipeline::builder()
//!     .config(CleanerConfig::default())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! println!("Cleaned {} rows", result.summary.rows);
//! ```
//!
//! # Location Resolution Only
//!
//! The location resolver works on plain slices and does not need Polars:
//!
//! ```rust,ignore
//! use listing_processing::{LocationResolver, RecordingSink};
//!
//! let sink = RecordingSink::new();
//! let (index, resolved) = LocationResolver::resolve_batch(
//!     &[Some("Nasr City, Cairo"), Some("Nasr City"), None],
//!     &sink,
//! )?;
//!
//! assert_eq!(resolved.governorates[1].as_deref(), Some("Cairo"));
//! assert_eq!(resolved.region_labels(), vec!["Capital", "Capital", "nan"]);
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod ingest;
pub mod location;
pub mod pipeline;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::ListingCleaner;
pub use config::{CleanerConfig, CleanerConfigBuilder, ColumnNames, ConfigValidationError};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use ingest::{MergeSummary, merge_directory, read_listings_csv, write_csv};
pub use location::{
    CityGovernorateIndex, ClosureSink, Diagnostic, DiagnosticSink, GovernorateIndexBuilder,
    LocationResolver, RecordingSink, Region, RegionClassifier, ResolvedLocations, TracingSink,
};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use types::{ActionType, CleaningAction, CleaningResult, CleaningSummary, LocationSummary};
