//! Categorical encoding of the TLD column
//!
//! The encoder is fit once on the full pre-split dataset and returned as an
//! explicit value. It is persisted next to the processed tables so that new
//! records can be encoded with the same codes at inference time.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::schema::TLD_COLUMN;

/// Name of the encoded output column
pub const TLD_ENCODED_COLUMN: &str = "tld_encoded";

/// Bijective mapping from TLD strings to dense integer codes.
///
/// Codes follow the lexicographic order of the distinct values seen during
/// fitting: the smallest TLD is 0, the next 1, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TldEncoder {
    /// Source column the encoder was fit on
    pub column: String,
    /// Distinct values in code order
    classes: Vec<String>,
}

impl TldEncoder {
    /// Fit on a sequence of values; duplicates collapse to one code
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        Self {
            column: TLD_COLUMN.to_string(),
            classes,
        }
    }

    /// Code for `value`, or `None` if it was not seen during fitting
    pub fn encode(&self, value: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|i| i as u32)
    }

    /// Original value for `code`
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Serialize the encoder state as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize TLD encoder")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write TLD encoder to {}", path.display()))?;
        Ok(())
    }

    /// Reload an encoder written by [`TldEncoder::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read TLD encoder from {}", path.display()))?;
        let encoder = serde_json::from_str(&json)
            .with_context(|| format!("Invalid TLD encoder file: {}", path.display()))?;
        Ok(encoder)
    }
}

/// Fit the encoder on the `TLD` column, add `tld_encoded` and drop `TLD`.
///
/// Null TLD values cannot be encoded and fail the stage.
pub fn encode_tld(mut df: DataFrame) -> Result<(DataFrame, TldEncoder)> {
    let column = df
        .column(TLD_COLUMN)
        .map_err(|_| PipelineError::missing_column(TLD_COLUMN))?
        .cast(&DataType::String)?;

    let values: Vec<Option<&str>> = column.str()?.into_iter().collect();
    if let Some(row) = values.iter().position(Option::is_none) {
        return Err(PipelineError::invalid_column(
            TLD_COLUMN,
            format!("null value at row {} cannot be encoded", row),
        )
        .into());
    }

    let values: Vec<&str> = values.into_iter().flatten().collect();
    let encoder = TldEncoder::fit(values.iter().copied());

    let codes: Vec<i64> = values
        .iter()
        .map(|v| {
            encoder
                .encode(v)
                .map(i64::from)
                .ok_or_else(|| PipelineError::invalid_column(TLD_COLUMN, format!("'{}' not fitted", v)))
        })
        .collect::<std::result::Result<_, _>>()?;

    df.with_column(Column::new(TLD_ENCODED_COLUMN.into(), codes))?;
    let df = df.drop(TLD_COLUMN)?;

    Ok((df, encoder))
}
