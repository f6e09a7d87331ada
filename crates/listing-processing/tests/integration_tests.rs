//! Integration tests for the listing cleaning pipeline.
//!
//! These tests run the pipeline end to end over the CSV fixtures.

use listing_processing::{
    CleanerConfig, Diagnostic, LocationResolver, Pipeline, PipelineStage, ProcessingError,
    RecordingSink, merge_directory, read_listings_csv, write_csv,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_sample() -> DataFrame {
    read_listings_csv(fixtures_path().join("listings_sample.csv"))
        .expect("Failed to read listings fixture")
}

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .expect("column should exist")
        .as_materialized_series()
        .str()
        .expect("column should be a string column")
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn ints(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
    df.column(name)
        .expect("column should exist")
        .as_materialized_series()
        .i64()
        .expect("column should be Int64")
        .into_iter()
        .collect()
}

fn some(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_sample() {
    let df = load_sample();
    assert_eq!(df.shape(), (11, 14));

    let result = Pipeline::builder().build().unwrap().process(df).unwrap();
    let data = &result.data;

    assert_eq!(data.height(), 11);

    let mut cities = some(&[
        "Nasr City",
        "Nasr City",
        "Sheikh Zayed",
        "سموحة",
        "Hurghada",
        "New Cairo",
        "Smouha",
    ]);
    cities.push(None);
    cities.extend(some(&["Dokki", "Zagazig", "Port Fouad"]));
    assert_eq!(strings(data, "city"), cities);

    let mut governorates = some(&[
        "Cairo",
        "Cairo",
        "Giza",
        "الإسكندرية",
        "error city",
        "Cairo",
        "Alexandria",
    ]);
    governorates.push(None);
    governorates.extend(some(&["Giza", "Sharqia", "Port Fouad"]));
    assert_eq!(strings(data, "governorate"), governorates);

    assert_eq!(
        strings(data, "region"),
        some(&[
            "Capital",
            "Capital",
            "Capital",
            "nan",
            "nan",
            "Capital",
            "Alexandria",
            "nan",
            "Capital",
            "Lower Egypt",
            "nan",
        ])
    );

    let location = result.summary.location.as_ref().unwrap();
    assert_eq!(location.missing_locations, 1);
    assert_eq!(location.indexed_cities, 9);
    assert_eq!(location.unresolved_cities, vec!["Hurghada"]);
    assert_eq!(
        location.unknown_governorates,
        vec!["Port Fouad", "error city", "الإسكندرية"]
    );
    assert_eq!(location.region_counts.get("Capital"), Some(&5));
    assert_eq!(location.region_counts.get("nan"), Some(&4));
}

#[test]
fn test_numeric_columns_from_fixture() {
    let result = Pipeline::builder().build().unwrap().process(load_sample()).unwrap();
    let data = &result.data;

    assert_eq!(
        ints(data, "bedrooms"),
        [3i64, 1, 5, 2, 2, 3, 3, 0, 2, 2, 2].map(Some).to_vec()
    );
    assert_eq!(
        ints(data, "level"),
        [4i64, 0, 10, 7, 1, 2, 10, 3, 5, 3, 3].map(Some).to_vec()
    );
    assert_eq!(
        ints(data, "area"),
        [165i64, 60, 450, 120, 85, 180, 200, 100, 110, 95, 90]
            .map(Some)
            .to_vec()
    );
}

#[test]
fn test_features_dates_and_amenities_from_fixture() {
    let result = Pipeline::builder().build().unwrap().process(load_sample()).unwrap();
    let data = &result.data;

    let furnished: Vec<bool> = data
        .column("furnished")
        .unwrap()
        .as_materialized_series()
        .bool()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or(false))
        .collect();
    assert_eq!(furnished.iter().filter(|f| **f).count(), 3);
    assert!(furnished[0] && furnished[2] && furnished[3]);

    let compound = strings(data, "compound");
    assert_eq!(compound[2].as_deref(), Some("compound name is specified"));
    assert_eq!(compound[4].as_deref(), Some("Mangroovy"));
    assert_eq!(compound[8].as_deref(), Some("compound name is specified"));
    assert_eq!(compound[0].as_deref(), Some("Not Available"));

    let months = strings(data, "month");
    assert_eq!(months[0].as_deref(), Some("May"));
    assert_eq!(months[3].as_deref(), Some("June"));
    assert_eq!(months[9], None);

    let delivery = strings(data, "delivery_date");
    assert_eq!(delivery[1].as_deref(), Some("2025-06-01"));
    assert_eq!(delivery[0].as_deref(), Some("Not Available"));

    assert!(data.column("amenties").is_err());
    let pool: Vec<Option<i32>> = data
        .column("Pool")
        .unwrap()
        .as_materialized_series()
        .i32()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(pool.iter().filter(|v| **v == Some(1)).count(), 2);
}

#[test]
fn test_write_and_reread_cleaned_output() {
    let mut result = Pipeline::builder().build().unwrap().process(load_sample()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("cleaned.csv");

    write_csv(&mut result.data, &path).unwrap();
    let back = read_listings_csv(&path).unwrap();

    assert_eq!(back.shape(), result.data.shape());
    assert_eq!(strings(&back, "region"), strings(&result.data, "region"));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_location_only_pipeline() {
    let config = CleanerConfig::builder()
        .clean_numeric(false)
        .extract_features(false)
        .clean_dates(false)
        .encode_amenities(false)
        .build()
        .unwrap();

    let df = load_sample();
    let width = df.width();
    let result = Pipeline::builder().config(config).build().unwrap().process(df).unwrap();

    assert_eq!(result.data.width(), width + 3);
    assert_eq!(result.summary.steps_applied, vec!["location"]);
    // Untouched columns keep their raw text
    assert_eq!(strings(&result.data, "level")[1].as_deref(), Some("Ground"));
}

#[test]
fn test_config_from_json() {
    let config = CleanerConfig::from_json(
        r#"{"columns": {"location": "address"}, "encode_amenities": false}"#,
    )
    .unwrap();
    let df = load_sample()
        .rename("location", "address".into())
        .unwrap()
        .clone();

    let result = Pipeline::builder().config(config).build().unwrap().process(df).unwrap();

    assert_eq!(strings(&result.data, "city")[0].as_deref(), Some("Nasr City"));
    assert!(result.data.column("amenties").is_ok());
}

#[test]
fn test_missing_location_column_fails() {
    let df = load_sample().drop("location").unwrap();
    let err = Pipeline::builder().build().unwrap().process(df).unwrap_err();

    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    assert!(err.is_recoverable());
}

// ============================================================================
// Diagnostics and Progress Tests
// ============================================================================

#[test]
fn test_diagnostics_from_fixture() {
    let sink = Arc::new(RecordingSink::new());
    Pipeline::builder()
        .diagnostics(sink.clone())
        .build()
        .unwrap()
        .process(load_sample())
        .unwrap();

    let diagnostics = sink.diagnostics();
    let unresolved: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::UnresolvedCity { .. }))
        .collect();
    assert_eq!(
        unresolved,
        vec![&Diagnostic::UnresolvedCity {
            token: "Hurghada".to_string()
        }]
    );
    // One per row whose governorate has no region: Arabic, error city, Port Fouad
    let unknown = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::UnknownGovernorate { .. }))
        .count();
    assert_eq!(unknown, 3);
}

#[test]
fn test_progress_callback_reaches_complete() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let last_stage = Arc::new(std::sync::Mutex::new(None));
    let last_stage_clone = Arc::clone(&last_stage);

    Pipeline::builder()
        .on_progress(move |update| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            *last_stage_clone.lock().unwrap() = Some(update.stage);
        })
        .build()
        .unwrap()
        .process(load_sample())
        .unwrap();

    assert!(calls.load(Ordering::SeqCst) > 5);
    assert_eq!(*last_stage.lock().unwrap(), Some(PipelineStage::Complete));
}

// ============================================================================
// Resolver Properties
// ============================================================================

#[test]
fn test_resolution_is_independent_of_row_duplication() {
    let df = load_sample();
    let locations: Vec<Option<String>> = strings(&df, "location");
    let refs: Vec<Option<&str>> = locations.iter().map(|l| l.as_deref()).collect();

    let mut doubled = refs.clone();
    doubled.extend(refs.iter().copied());

    let sink = RecordingSink::new();
    let (_, single) = LocationResolver::resolve_batch(&refs, &sink).unwrap();
    let (_, twice) = LocationResolver::resolve_batch(&doubled, &sink).unwrap();

    assert_eq!(&twice.governorates[..refs.len()], &single.governorates[..]);
    assert_eq!(&twice.governorates[refs.len()..], &single.governorates[..]);
}

// ============================================================================
// Merge Tests
// ============================================================================

#[test]
fn test_merge_raw_fixtures() {
    let (merged, summary) = merge_directory(fixtures_path().join("raw"), "id").unwrap();

    assert_eq!(summary.files_read.len(), 2);
    assert_eq!(summary.rows_read, 6);
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(merged.height(), 5);
    assert_eq!(strings(&merged, "id"), some(&["1", "2", "3", "4", "5"]));
    // The first file's copy of listing 3 wins
    assert_eq!(
        strings(&merged, "title")[2].as_deref(),
        Some("Villa in Sheikh Zayed")
    );
    assert_eq!(strings(&merged, "price")[2], None);
}

#[test]
fn test_merge_then_clean() {
    let (merged, _) = merge_directory(fixtures_path().join("raw"), "id").unwrap();
    let result = Pipeline::builder().build().unwrap().process(merged).unwrap();

    assert_eq!(
        strings(&result.data, "governorate"),
        some(&["Cairo", "Cairo", "Giza", "error city", "Alexandria"])
    );
    // Only the columns present in the raw files were cleaned
    assert!(result.summary.steps_skipped.contains(&"amenities".to_string()));
    assert!(result.summary.steps_applied.contains(&"bedrooms".to_string()));
}

#[test]
fn test_merge_missing_directory() {
    let err = merge_directory(fixtures_path().join("does_not_exist"), "id").unwrap_err();
    assert!(matches!(err, ProcessingError::WithContext { .. }));
    assert_eq!(err.error_code(), "IO_ERROR");
}
