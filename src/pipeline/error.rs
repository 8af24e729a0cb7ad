//! Domain error types for the preprocessing pipeline.
//!
//! Plumbing failures (I/O, polars) travel as `anyhow::Error` with context.
//! The conditions callers are expected to match on are raised as
//! `PipelineError` and can be recovered with `err.downcast_ref::<PipelineError>()`.

use std::path::PathBuf;

use thiserror::Error;

use super::balance::SamplingStrategy;

/// Errors raised by the preprocessing stages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The input path does not resolve to a file.
    #[error("Dataset not found at {}", path.display())]
    DatasetNotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// A class has too few rows for synthetic oversampling.
    #[error("Class {class} has only {count} example(s); at least 2 are required for oversampling")]
    ClassTooSmall {
        /// Label value of the offending class
        class: i64,
        /// Number of rows carrying that label
        count: usize,
    },

    /// A class that must be oversampled has no more rows than the neighbor count.
    #[error(
        "k_neighbors = {k_neighbors} requires more than {k_neighbors} rows in class {class}, found {count}"
    )]
    InvalidNeighborCount {
        /// Effective neighbor count after the safety policy
        k_neighbors: usize,
        /// Label value of the offending class
        class: i64,
        /// Number of rows carrying that label
        count: usize,
    },

    /// The sampling strategy cannot bring every class to the same count.
    #[error(
        "Sampling strategy '{strategy}' cannot equalize {classes} classes; use auto, not-majority or all"
    )]
    UnsupportedStrategy {
        /// Strategy that was requested
        strategy: SamplingStrategy,
        /// Number of distinct labels in the data
        classes: usize,
    },

    /// A required column is absent from the dataset.
    #[error("Required column '{column}' not found in dataset")]
    MissingColumn {
        /// Column name
        column: String,
    },

    /// A column exists but its values cannot be used by the consuming stage.
    #[error("Column '{column}' is invalid: {reason}")]
    InvalidColumn {
        /// Column name
        column: String,
        /// What is wrong with it
        reason: String,
    },

    /// The file extension is not a supported tabular format.
    #[error("Unsupported file format: '{extension}'. Supported formats: csv, parquet")]
    UnsupportedFormat {
        /// Lower-cased extension found on the path
        extension: String,
    },

    /// No rows remain to process.
    #[error("Dataset contains no rows with a label")]
    EmptyDataset,
}

impl PipelineError {
    pub(crate) fn missing_column(column: &str) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
        }
    }

    pub(crate) fn invalid_column(column: &str, reason: impl Into<String>) -> Self {
        Self::InvalidColumn {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
