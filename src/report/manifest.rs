//! JSON manifest describing a preprocessing run

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{ArtifactPaths, BalancerConfig};

use super::summary::PreprocessSummary;

pub const MANIFEST_FILE: &str = "run_manifest.json";

/// Metadata about the run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Phishprep version
    pub phishprep_version: String,
    /// Input file path
    pub input_file: String,
    /// Balancer configuration as supplied
    pub balancer_config: BalancerConfig,
    /// Neighbor count after the minority size policy
    pub effective_k_neighbors: usize,
    /// Whether a two-row minority class forced the neighbor count to 1
    pub k_neighbors_forced: bool,
}

/// Row and column accounting for the run
#[derive(Serialize)]
pub struct RunCounts {
    pub rows_loaded: usize,
    pub rows_missing_label: usize,
    pub class_counts_before: BTreeMap<String, usize>,
    pub class_counts_after: BTreeMap<String, usize>,
    pub synthetic_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_columns: usize,
    pub tld_classes: usize,
}

/// Complete manifest written next to the artifacts
#[derive(Serialize)]
pub struct RunManifest {
    pub metadata: RunMetadata,
    pub counts: RunCounts,
    /// Artifact file names, relative to the output directory
    pub artifacts: Vec<String>,
    pub dropped_columns: Vec<String>,
}

impl RunManifest {
    pub fn new(
        input: &Path,
        config: &BalancerConfig,
        summary: &PreprocessSummary,
        artifacts: &ArtifactPaths,
    ) -> Self {
        // JSON object keys must be strings
        let keyed = |counts: &BTreeMap<i64, usize>| -> BTreeMap<String, usize> {
            counts.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        };

        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                phishprep_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input.display().to_string(),
                balancer_config: *config,
                effective_k_neighbors: summary.k_neighbors,
                k_neighbors_forced: summary.k_forced,
            },
            counts: RunCounts {
                rows_loaded: summary.rows_loaded,
                rows_missing_label: summary.missing_labels,
                class_counts_before: keyed(&summary.class_counts_before),
                class_counts_after: keyed(&summary.class_counts_after),
                synthetic_rows: summary.synthetic_rows,
                train_rows: summary.train_rows,
                test_rows: summary.test_rows,
                feature_columns: summary.final_features,
                tld_classes: summary.tld_classes,
            },
            artifacts: artifacts
                .all()
                .iter()
                .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
                .collect(),
            dropped_columns: summary.dropped_columns.clone(),
        }
    }

    /// Write the manifest as pretty JSON into `output_dir`
    pub fn write(&self, output_dir: &Path) -> Result<std::path::PathBuf> {
        let path = output_dir.join(MANIFEST_FILE);
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize run manifest")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write run manifest to {}", path.display()))?;
        Ok(path)
    }
}
