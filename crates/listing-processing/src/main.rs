//! CLI entry point for the listing cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use listing_processing::{
    CleanerConfig, CleaningSummary, MergeSummary, Pipeline, merge_directory, read_listings_csv,
    write_csv,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Cleaning pipeline for scraped property listings",
    long_about = "Cleans scraped property listings: resolves city, governorate and region \
                  from free-text locations, normalizes numeric fields, extracts text \
                  features, decomposes dates and one-hot encodes amenities.\n\n\
                  EXAMPLES:\n  \
                  # Merge scraper runs, then clean\n  \
                  listing-processing merge -d data/raw -o data/merged.csv\n  \
                  listing-processing clean -i data/merged.csv -o data/cleaned.csv\n\n  \
                  # Machine-readable summary\n  \
                  listing-processing clean -i raw.csv -o cleaned.csv --json | jq .location"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean a CSV of raw listings
    Clean(CleanArgs),
    /// Merge every CSV in a directory and drop duplicate listings
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Path to the raw listings CSV
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the cleaned CSV to write
    #[arg(short, long, default_value = "./outputs/cleaned.csv")]
    output: PathBuf,

    /// JSON configuration file (missing fields take their defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the raw location column
    #[arg(long)]
    location_column: Option<String>,

    /// Skip city/governorate/region derivation
    #[arg(long)]
    skip_location: bool,

    /// Skip bedrooms/bathrooms/level/area normalization
    #[arg(long)]
    skip_numeric: bool,

    /// Skip furnished/compound extraction
    #[arg(long)]
    skip_features: bool,

    /// Skip date decomposition and delivery flags
    #[arg(long)]
    skip_dates: bool,

    /// Skip amenities encoding
    #[arg(long)]
    skip_amenities: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the cleaning summary.
    #[arg(long)]
    json: bool,

    /// Write the cleaning summary next to the output as <output_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Directory holding the CSV files to merge
    #[arg(short, long)]
    dir: PathBuf,

    /// Path of the merged CSV to write
    #[arg(short, long, default_value = "./outputs/merged.csv")]
    output: PathBuf,

    /// Column identifying a listing; later rows with a seen key are dropped
    #[arg(short, long, default_value = "id")]
    key: String,

    /// Output the merge summary as JSON to stdout
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_output = match &cli.command {
        Command::Clean(args) => args.json,
        Command::Merge(args) => args.json,
    };
    init_logging(&cli.log_level, cli.quiet, json_output);

    match cli.command {
        Command::Clean(args) => run_clean(&args),
        Command::Merge(args) => run_merge(&args),
    }
}

/// Load the configuration file (if any) and apply the command-line overrides.
fn build_config(args: &CleanArgs) -> Result<CleanerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            CleanerConfig::from_json(&json)?
        }
        None => CleanerConfig::default(),
    };

    if let Some(column) = &args.location_column {
        config.columns.location = column.clone();
    }
    config.clean_location &= !args.skip_location;
    config.clean_numeric &= !args.skip_numeric;
    config.extract_features &= !args.skip_features;
    config.clean_dates &= !args.skip_dates;
    config.encode_amenities &= !args.skip_amenities;

    config.validate()?;
    Ok(config)
}

fn run_clean(args: &CleanArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = build_config(args)?;

    info!("Loading listings from: {}", args.input.display());
    let data = read_listings_csv(&args.input)?;
    info!("Listings loaded: {:?}", data.shape());

    let pipeline = Pipeline::builder().config(config).build()?;
    let mut result = match pipeline.process(data) {
        Ok(result) => result,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    write_csv(&mut result.data, &args.output)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.summary)?);
        return Ok(());
    }

    if args.emit_report {
        let report_path = report_path(&args.output);
        std::fs::write(&report_path, serde_json::to_string_pretty(&result.summary)?)?;
        info!("Report written to: {}", report_path.display());
    }

    print_clean_summary(&result.summary, args);
    Ok(())
}

fn run_merge(args: &MergeArgs) -> Result<()> {
    let (mut merged, summary) = merge_directory(&args.dir, &args.key)?;
    write_csv(&mut merged, &args.output)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_merge_summary(&summary, merged.height(), &args.output);
    Ok(())
}

/// `<dir>/<output_stem>_report.json` for an output CSV path.
fn report_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{}_report.json", stem))
}

/// Print a human-readable summary of the cleaning results.
fn print_clean_summary(summary: &CleaningSummary, args: &CleanArgs) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!("Input:  {}", args.input.display());
    println!(
        "Output: {} ({} rows x {} columns)",
        args.output.display(),
        summary.rows,
        summary.columns_after
    );
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Columns: {} -> {} ({:+})",
        summary.columns_before,
        summary.columns_after,
        summary.columns_added()
    );
    println!("  Steps applied: {}", summary.steps_applied.join(", "));
    if !summary.steps_skipped.is_empty() {
        println!("  Steps skipped: {}", summary.steps_skipped.join(", "));
    }
    println!();

    if let Some(location) = &summary.location {
        println!("Locations:");
        println!("  Cities indexed: {}", location.indexed_cities);
        println!("  Missing locations: {}", location.missing_locations);
        println!("  Unresolved cities: {}", location.unresolved_cities.len());
        for (region, count) in &location.region_counts {
            println!("  {:<14} {}", region, count);
        }
        println!();
    }

    if !summary.actions.is_empty() {
        println!("Actions Taken:");
        for action in &summary.actions {
            println!(
                "  [{}] {}: {}",
                action.action_type.display_name(),
                action.target,
                action.description
            );
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  - {}", warning);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the summary as JSON");
    println!("{}", "=".repeat(80));
}

fn print_merge_summary(summary: &MergeSummary, rows: usize, output: &Path) {
    println!();
    println!("{}", "=".repeat(80));
    println!("MERGE COMPLETE");
    println!("{}", "=".repeat(80));
    println!("Files merged: {}", summary.files_read.len());
    for path in &summary.files_skipped {
        println!("  skipped: {}", path.display());
    }
    println!("Rows read: {}", summary.rows_read);
    println!("Duplicates removed: {}", summary.duplicates_removed);
    println!("Output: {} ({} rows)", output.display(), rows);
    println!("{}", "=".repeat(80));
}
