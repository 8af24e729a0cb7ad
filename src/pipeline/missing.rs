//! Missing label sanitization

use anyhow::Result;
use polars::prelude::*;

use super::error::PipelineError;
use super::schema::LABEL_COLUMN;

/// Result of removing unlabeled rows
#[derive(Debug, Clone)]
pub struct LabelSanitization {
    /// Rows that carry a label, in their original order
    pub df: DataFrame,
    /// Number of rows removed because the label was null
    pub missing_labels: usize,
}

/// Count rows whose label is null
pub fn count_missing_labels(df: &DataFrame) -> Result<usize> {
    let label = df
        .column(LABEL_COLUMN)
        .map_err(|_| PipelineError::missing_column(LABEL_COLUMN))?;
    Ok(label.null_count())
}

/// Drop rows with a null label.
///
/// The input frame is left untouched; the returned frame is a new value that
/// the caller takes ownership of. Nulls in other columns are not inspected.
pub fn drop_missing_labels(df: &DataFrame) -> Result<LabelSanitization> {
    let label = df
        .column(LABEL_COLUMN)
        .map_err(|_| PipelineError::missing_column(LABEL_COLUMN))?;

    let missing_labels = label.null_count();
    if missing_labels == 0 {
        return Ok(LabelSanitization {
            df: df.clone(),
            missing_labels,
        });
    }

    let mask = label.is_not_null();
    let cleaned = df.filter(&mask)?;

    Ok(LabelSanitization {
        df: cleaned,
        missing_labels,
    })
}
