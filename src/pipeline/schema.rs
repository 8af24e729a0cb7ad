//! Column names and the typed validation boundary for raw URL records
//!
//! Feature engineering never reads loosely-typed columns directly. The
//! required columns are checked and extracted here once, so a missing or
//! mistyped column fails with a single clear error before any derived value
//! is computed. Columns not listed here stay in the frame and pass through.

use anyhow::Result;
use polars::prelude::*;

use super::error::PipelineError;

/// Target class column (0 = legitimate, 1 = phishing)
pub const LABEL_COLUMN: &str = "label";
pub const URL_COLUMN: &str = "URL";
pub const DOMAIN_COLUMN: &str = "Domain";
pub const TITLE_COLUMN: &str = "Title";
pub const FILENAME_COLUMN: &str = "FILENAME";
pub const TLD_COLUMN: &str = "TLD";
pub const DOMAIN_TITLE_MATCH_COLUMN: &str = "DomainTitleMatchScore";
pub const IS_HTTPS_COLUMN: &str = "IsHTTPS";
pub const OBFUSCATION_RATIO_COLUMN: &str = "ObfuscationRatio";
pub const EXTERNAL_REF_COLUMN: &str = "NoOfExternalRef";

/// Columns that must exist before feature engineering
pub const REQUIRED_COLUMNS: [&str; 8] = [
    LABEL_COLUMN,
    URL_COLUMN,
    DOMAIN_COLUMN,
    TLD_COLUMN,
    DOMAIN_TITLE_MATCH_COLUMN,
    IS_HTTPS_COLUMN,
    OBFUSCATION_RATIO_COLUMN,
    EXTERNAL_REF_COLUMN,
];

/// The raw inputs of one row that derived features are computed from
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord<'a> {
    pub url: &'a str,
    pub domain: &'a str,
    pub tld: Option<&'a str>,
    pub domain_title_match_score: f64,
    pub is_https: bool,
    pub obfuscation_ratio: f64,
    pub external_refs: f64,
}

/// Required columns extracted into typed vectors, one entry per row
#[derive(Debug, Clone, Default)]
pub struct RawSignals {
    pub urls: Vec<String>,
    pub domains: Vec<String>,
    pub tlds: Vec<Option<String>>,
    pub domain_title_match_scores: Vec<f64>,
    pub https_flags: Vec<bool>,
    pub obfuscation_ratios: Vec<f64>,
    pub external_refs: Vec<f64>,
}

impl RawSignals {
    /// Validate the required columns of `df` and extract them.
    ///
    /// Null `URL`/`Domain` values become empty strings. Null numeric values
    /// are rejected rather than defaulted.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        validate_required_columns(df)?;

        Ok(Self {
            urls: text_column(df, URL_COLUMN)?,
            domains: text_column(df, DOMAIN_COLUMN)?,
            tlds: optional_text_column(df, TLD_COLUMN)?,
            domain_title_match_scores: numeric_column(df, DOMAIN_TITLE_MATCH_COLUMN)?,
            https_flags: numeric_column(df, IS_HTTPS_COLUMN)?
                .into_iter()
                .map(|v| v != 0.0)
                .collect(),
            obfuscation_ratios: numeric_column(df, OBFUSCATION_RATIO_COLUMN)?,
            external_refs: numeric_column(df, EXTERNAL_REF_COLUMN)?,
        })
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Iterate rows as typed records
    pub fn records(&self) -> impl Iterator<Item = SignalRecord<'_>> {
        (0..self.len()).map(move |i| SignalRecord {
            url: &self.urls[i],
            domain: &self.domains[i],
            tld: self.tlds[i].as_deref(),
            domain_title_match_score: self.domain_title_match_scores[i],
            is_https: self.https_flags[i],
            obfuscation_ratio: self.obfuscation_ratios[i],
            external_refs: self.external_refs[i],
        })
    }
}

/// Fail with the first required column that is absent
pub fn validate_required_columns(df: &DataFrame) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for column in REQUIRED_COLUMNS {
        if !present.iter().any(|c| c == column) {
            return Err(PipelineError::missing_column(column).into());
        }
    }
    Ok(())
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    Ok(optional_text_column(df, name)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

fn optional_text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::missing_column(name))?;

    // An all-null text column is inferred as a non-string dtype by the reader
    let as_text = column
        .cast(&DataType::String)
        .map_err(|e| PipelineError::invalid_column(name, e.to_string()))?;

    Ok(as_text
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::missing_column(name))?;

    if !column.dtype().is_primitive_numeric() && column.dtype() != &DataType::Boolean {
        return Err(PipelineError::invalid_column(
            name,
            format!("expected a numeric column, found {}", column.dtype()),
        )
        .into());
    }

    let as_float = column.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = as_float.f64()?.into_iter().collect();

    if let Some(row) = values.iter().position(Option::is_none) {
        return Err(
            PipelineError::invalid_column(name, format!("null value at row {}", row)).into(),
        );
    }

    Ok(values.into_iter().flatten().collect())
}
