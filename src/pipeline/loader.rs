//! Dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::error::PipelineError;

/// Default number of rows used for CSV schema inference
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// Load a dataset from a file (CSV or Parquet based on extension).
///
/// Column names and row order are preserved as found in the file. A path that
/// does not resolve to a file fails with [`PipelineError::DatasetNotFound`];
/// every other read failure is propagated as-is.
///
/// # Arguments
/// * `path` - Path to the input table
/// * `infer_schema_length` - Rows scanned for CSV type inference (0 = full scan)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PipelineError::DatasetNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let extension = file_extension(path);

    let lf = match extension.as_str() {
        "csv" => {
            let infer = if infer_schema_length == 0 {
                None
            } else {
                Some(infer_schema_length)
            };
            LazyCsvReader::new(path)
                .with_has_header(true)
                .with_infer_schema_length(infer)
                .finish()
                .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        }
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => return Err(PipelineError::UnsupportedFormat { extension }.into()),
    };

    let df = lf
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;

    Ok(df)
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
