//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the listing cleaning workflow.

use crate::cleaner::ListingCleaner;
use crate::config::{CleanerConfig, ConfigValidationError};
use crate::error::{ProcessingError, Result, ResultExt};
use crate::location::{DiagnosticSink, TracingSink};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::types::{CleaningAction, CleaningResult, CleaningSummary};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// One column step of a pipeline stage.
type Step = fn(&ListingCleaner, &mut DataFrame) -> Result<CleaningAction>;

/// The listing cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use listing_processing::{CleanerConfig, Pipeline, RecordingSink};
/// use std::sync::Arc;
///
/// let diagnostics = Arc::new(RecordingSink::new());
///
/// let result = Pipeline::builder()
///     .config(CleanerConfig::builder().encode_amenities(false).build()?)
///     .diagnostics(diagnostics.clone())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("{} location diagnostics", diagnostics.len());
/// ```
pub struct Pipeline {
    cleaner: ListingCleaner,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure Pipeline is Send (can be moved to a worker thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline applies.
    pub fn config(&self) -> &CleanerConfig {
        self.cleaner.config()
    }

    /// Clean a DataFrame of raw listings.
    ///
    /// Rows are never added, removed or reordered. Steps whose source column
    /// is absent are skipped with a warning in the summary.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::ColumnNotFound`] when location cleaning is
    /// enabled and the location column is absent. Other errors come from
    /// the underlying DataFrame operations.
    pub fn process(&self, df: DataFrame) -> Result<CleaningResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, mut df: DataFrame) -> Result<CleaningResult> {
        let start_time = Instant::now();
        let config = self.cleaner.config();

        info!("Starting cleaning pipeline...");
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Initializing,
            0.0,
            "Starting cleaning pipeline...",
        ));

        let mut summary = CleaningSummary::new();
        summary.rows = df.height();
        summary.columns_before = df.width();

        // Step 1: Location
        if config.clean_location {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Location,
                0.0,
                "Resolving locations...",
            ));
            info!("Step 1: Resolving locations...");

            let (action, location) = self
                .cleaner
                .clean_location(&mut df)
                .context("Location resolution failed")?;
            summary.add_action(action);
            summary.location = Some(location);
            summary.steps_applied.push("location".to_string());

            self.report_progress(ProgressUpdate::new(
                PipelineStage::Location,
                1.0,
                "Location resolution complete",
            ));
        } else {
            info!("Step 1: Skipping location resolution (disabled)");
            summary.steps_skipped.push("location".to_string());
        }

        // Step 2: Numeric columns
        let numeric: [(&str, Step); 4] = [
            ("bedrooms", ListingCleaner::clean_bedrooms),
            ("bathrooms", ListingCleaner::clean_bathrooms),
            ("levels", ListingCleaner::clean_levels),
            ("area", ListingCleaner::clean_area),
        ];
        self.run_stage(
            PipelineStage::Numeric,
            config.clean_numeric,
            &numeric,
            &mut df,
            &mut summary,
        )?;

        // Step 3: Text features
        let features: [(&str, Step); 2] = [
            ("furnished", ListingCleaner::extract_furnished),
            ("compound", ListingCleaner::extract_compound),
        ];
        self.run_stage(
            PipelineStage::Features,
            config.extract_features,
            &features,
            &mut df,
            &mut summary,
        )?;

        // Step 4: Dates
        let dates: [(&str, Step); 2] = [
            ("date", ListingCleaner::clean_date),
            ("delivery", ListingCleaner::clean_delivery),
        ];
        self.run_stage(
            PipelineStage::Dates,
            config.clean_dates,
            &dates,
            &mut df,
            &mut summary,
        )?;

        // Step 5: Amenities
        let amenities: [(&str, Step); 1] = [("amenities", ListingCleaner::clean_amenities)];
        self.run_stage(
            PipelineStage::Amenities,
            config.encode_amenities,
            &amenities,
            &mut df,
            &mut summary,
        )?;

        summary.columns_after = df.width();
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Pipeline complete: {} rows, {} -> {} columns in {}ms",
            summary.rows, summary.columns_before, summary.columns_after, summary.duration_ms
        );

        Ok(CleaningResult { data: df, summary })
    }

    /// Run the steps of one stage in order.
    ///
    /// A step whose source column is missing is skipped and recorded as a
    /// warning; any other error stops the pipeline.
    fn run_stage(
        &self,
        stage: PipelineStage,
        enabled: bool,
        steps: &[(&str, Step)],
        df: &mut DataFrame,
        summary: &mut CleaningSummary,
    ) -> Result<()> {
        if !enabled {
            info!("Skipping {} (disabled)", stage.display_name());
            summary
                .steps_skipped
                .extend(steps.iter().map(|(name, _)| name.to_string()));
            return Ok(());
        }

        info!("{}...", stage.display_name());
        for (i, (name, step)) in steps.iter().enumerate() {
            self.report_progress(ProgressUpdate::with_items(
                stage,
                *name,
                i,
                steps.len(),
                format!("{}: {}", stage.display_name(), name),
            ));

            match step(&self.cleaner, df) {
                Ok(action) => {
                    summary.add_action(action);
                    summary.steps_applied.push(name.to_string());
                }
                Err(ProcessingError::ColumnNotFound(column)) => {
                    warn!("Skipping {}: column '{}' not found", name, column);
                    summary.add_warning(format!("Skipped {}: column '{}' not found", name, column));
                    summary.steps_skipped.push(name.to_string());
                }
                Err(e) => return Err(e.with_context(format!("Step '{}' failed", name))),
            }
        }

        self.report_progress(ProgressUpdate::new(
            stage,
            1.0,
            format!("{} complete", stage.display_name()),
        ));
        Ok(())
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleanerConfig>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the cleaning configuration.
    pub fn config(mut self, config: CleanerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set where location diagnostics go.
    ///
    /// Defaults to [`TracingSink`], which logs each diagnostic.
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use listing_processing::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let diagnostics = self.diagnostics.unwrap_or_else(|| Arc::new(TracingSink));

        Ok(Pipeline {
            cleaner: ListingCleaner::with_diagnostics(config, diagnostics),
            progress_reporter: self.progress_reporter,
        })
    }
}
