//! Reading, writing and merging listing CSV files.
//!
//! The scraper writes one CSV per run. [`merge_directory`] stacks every
//! file in a directory into a single batch and drops listings scraped more
//! than once, so the cleaning pipeline sees each listing a single time.

use crate::error::{ProcessingError, Result, ResultExt};
use crate::utils::has_column;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Read a listings CSV with a header row. Every column is read as a string.
pub fn read_listings_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    debug!("Reading {}", path.display());

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open '{}'", path.display()))?
        .finish()
        .context(format!("Failed to parse '{}'", path.display()))
}

/// Write a DataFrame as CSV with a header row, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Failed to write '{}'", path.display()))?;

    info!("Saved {} rows to {}", df.height(), path.display());
    Ok(())
}

/// What [`merge_directory`] read and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// Files stacked into the result, in merge order.
    pub files_read: Vec<PathBuf>,
    /// Files that could not be read.
    pub files_skipped: Vec<PathBuf>,
    /// Rows across all files before deduplication.
    pub rows_read: usize,
    /// Rows dropped because an earlier row had the same key.
    pub duplicates_removed: usize,
}

/// Stack every `*.csv` file in `dir` and drop rows with a repeated `key`.
///
/// Files are merged in file-name order. Columns are unioned; a file without
/// some column contributes nulls for it. The first row for each key is kept.
/// Unreadable files are skipped with a warning.
pub fn merge_directory(dir: impl AsRef<Path>, key: &str) -> Result<(DataFrame, MergeSummary)> {
    let dir = dir.as_ref();
    let files = csv_files(dir)?;
    let mut summary = MergeSummary::default();

    let mut frames = Vec::with_capacity(files.len());
    for path in files {
        match read_listings_csv(&path) {
            Ok(df) => {
                debug!("Read {} rows from {}", df.height(), path.display());
                summary.rows_read += df.height();
                summary.files_read.push(path);
                frames.push(df);
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                summary.files_skipped.push(path);
            }
        }
    }

    if frames.is_empty() {
        return Err(ProcessingError::NoInputFiles(dir.display().to_string()));
    }

    let stacked = stack_frames(frames)?;
    let deduplicated = drop_duplicate_keys(&stacked, key)?;
    summary.duplicates_removed = stacked.height() - deduplicated.height();

    info!(
        "Merged {} files into {} rows ({} duplicates removed)",
        summary.files_read.len(),
        deduplicated.height(),
        summary.duplicates_removed
    );

    Ok((deduplicated, summary))
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ProcessingError::Io(e).with_context(format!("Failed to list '{}'", dir.display()))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();

    if files.is_empty() {
        return Err(ProcessingError::NoInputFiles(dir.display().to_string()));
    }

    files.sort();
    Ok(files)
}

/// Vertically stack frames over the union of their columns.
fn stack_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for df in &frames {
        for name in df.get_column_names() {
            if seen.insert(name.to_string()) {
                columns.push(name.to_string());
            }
        }
    }

    let mut stacked: Option<DataFrame> = None;
    for mut df in frames {
        for name in &columns {
            if !has_column(&df, name) {
                df.with_column(Series::full_null(
                    name.as_str().into(),
                    df.height(),
                    &DataType::String,
                ))?;
            }
        }
        let aligned = df.select(columns.iter().map(String::as_str))?;

        match stacked.as_mut() {
            Some(acc) => {
                acc.vstack_mut(&aligned)?;
            }
            None => stacked = Some(aligned),
        }
    }

    stacked.ok_or_else(|| ProcessingError::NoInputFiles("no frames to stack".to_string()))
}

/// Keep the first row for each value of `key`, in input order. Missing keys
/// form a single group.
fn drop_duplicate_keys(df: &DataFrame, key: &str) -> Result<DataFrame> {
    if !has_column(df, key) {
        return Err(ProcessingError::ColumnNotFound(key.to_string()));
    }

    Ok(df.unique_stable(Some(&[key.to_string()]), UniqueKeepStrategy::First, None)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::string_values;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_listings_csv_all_strings() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "listings.csv",
            "id,bedrooms,location\n1,3,\"Maadi, Cairo\"\n2,,Zamalek\n",
        );

        let df = read_listings_csv(&path).unwrap();

        assert_eq!(df.shape(), (2, 3));
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
        assert_eq!(
            string_values(&df, "location").unwrap(),
            vec![Some("Maadi, Cairo".to_string()), Some("Zamalek".to_string())]
        );
        assert_eq!(string_values(&df, "bedrooms").unwrap()[1], None);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_listings_csv("/definitely/not/here.csv").unwrap_err();
        assert_eq!(err.error_code(), "POLARS_ERROR");
    }

    #[test]
    fn test_write_csv_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut df = df!("id" => &["1", "2"], "city" => &["Maadi", "Dokki"]).unwrap();

        write_csv(&mut df, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,city\n"));
        let back = read_listings_csv(&path).unwrap();
        assert_eq!(back.shape(), (2, 2));
    }

    #[test]
    fn test_merge_directory_dedupes_and_unions() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.csv", "id,price\n2,200\n3,300\n");
        write_file(dir.path(), "a.csv", "id,location\n1,Maadi\n2,Dokki\n");
        write_file(dir.path(), "notes.txt", "not a csv");

        let (df, summary) = merge_directory(dir.path(), "id").unwrap();

        assert_eq!(summary.files_read.len(), 2);
        assert_eq!(summary.rows_read, 4);
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(df.height(), 3);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["id", "location", "price"]);
        assert_eq!(
            string_values(&df, "id").unwrap(),
            vec![Some("1".to_string()), Some("2".to_string()), Some("3".to_string())]
        );
        // id 2 comes from a.csv, which sorts first
        assert_eq!(string_values(&df, "location").unwrap()[1], Some("Dokki".to_string()));
        assert_eq!(string_values(&df, "price").unwrap()[1], None);
    }

    #[test]
    fn test_merge_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = merge_directory(dir.path(), "id").unwrap_err();
        assert_eq!(err.error_code(), "NO_INPUT_FILES");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_merge_missing_key() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.csv", "url,location\nx,Maadi\n");
        let err = merge_directory(dir.path(), "id").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_drop_duplicate_keys_keeps_first() {
        let df = df!(
            "id" => &[Some("1"), Some("1"), None, None],
            "v" => &["a", "b", "c", "d"]
        )
        .unwrap();

        let out = drop_duplicate_keys(&df, "id").unwrap();

        assert_eq!(
            string_values(&out, "v").unwrap(),
            vec![Some("a".to_string()), Some("c".to_string())]
        );
    }

    #[test]
    fn test_drop_duplicate_keys_keeps_input_order() {
        let df = df!(
            "id" => &["3", "1", "3", "2", "1"],
            "v" => &["a", "b", "c", "d", "e"]
        )
        .unwrap();

        let out = drop_duplicate_keys(&df, "id").unwrap();

        assert_eq!(
            string_values(&out, "id").unwrap(),
            vec![
                Some("3".to_string()),
                Some("1".to_string()),
                Some("2".to_string())
            ]
        );
        assert_eq!(
            string_values(&out, "v").unwrap(),
            vec![
                Some("a".to_string()),
                Some("b".to_string()),
                Some("d".to_string())
            ]
        );
    }

    #[test]
    fn test_drop_duplicate_keys_missing_key() {
        let df = df!("v" => &["a"]).unwrap();
        let err = drop_duplicate_keys(&df, "id").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
