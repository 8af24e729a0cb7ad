//! End-to-end preprocessing run
//!
//! Stages run strictly in order and each one takes ownership of the frame
//! produced by the previous one:
//! load → drop unlabeled rows → engineer features → prune identifiers →
//! encode TLD → balance classes → split → persist.
//!
//! Every stage that can fail on the data runs before the first artifact is
//! written, and the artifacts themselves are published all or nothing, so a
//! failed run never leaves a partial artifact set behind.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;

use crate::report::{PreprocessSummary, RunManifest};
use crate::utils::StepConsole;

use super::balance::{balance_classes, BalancerConfig};
use super::encoder::{encode_tld, TldEncoder};
use super::features::{engineer_features, DERIVED_COLUMNS};
use super::loader::{load_dataset, DEFAULT_INFER_SCHEMA_LENGTH};
use super::missing::drop_missing_labels;
use super::persist::{persist_artifacts, ArtifactPaths};
use super::prune::drop_identifier_columns;
use super::split::{train_test_split, TrainTestSplit, SPLIT_SEED, TEST_FRACTION};

/// Options that do not change the produced data
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Rows scanned for CSV type inference
    pub infer_schema_length: usize,
    /// Print step headers, spinners and counts
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
            verbose: false,
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub split: TrainTestSplit,
    pub encoder: TldEncoder,
    pub artifacts: ArtifactPaths,
    pub manifest: PathBuf,
    pub summary: PreprocessSummary,
}

/// Run the full pipeline quietly and return the four partitions
pub fn preprocess_pipeline(
    input: &Path,
    output_dir: &Path,
    config: &BalancerConfig,
) -> Result<TrainTestSplit> {
    Ok(run_pipeline(input, output_dir, config, &RunOptions::default())?.split)
}

/// Run the full pipeline with explicit options
pub fn run_pipeline(
    input: &Path,
    output_dir: &Path,
    config: &BalancerConfig,
    options: &RunOptions,
) -> Result<PipelineOutput> {
    let console = StepConsole::new(options.verbose);

    // Step 1: Load
    console.step(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = console.spinner("Reading dataset...");
    let df = load_dataset(input, options.infer_schema_length)?;
    console.finish(&spinner, "Dataset loaded");
    console.info(&format!("Rows: {}  Columns: {}", df.height(), df.width()));

    let mut summary = PreprocessSummary::new(df.height(), df.width());
    summary.record_time("load", step_start.elapsed());
    console.time(step_start.elapsed());

    // Step 2: Missing labels
    console.step(2, "Missing Labels");
    let step_start = Instant::now();
    let sanitized = drop_missing_labels(&df)?;
    drop(df);
    console.count("entries with missing labels", sanitized.missing_labels, None);
    if sanitized.missing_labels > 0 {
        console.success("Dropped unlabeled rows");
    }
    summary.missing_labels = sanitized.missing_labels;
    summary.record_time("missing_labels", step_start.elapsed());
    console.time(step_start.elapsed());

    // Step 3: Feature engineering
    console.step(3, "Feature Engineering");
    let step_start = Instant::now();
    let df = engineer_features(sanitized.df)?;
    summary.derived_columns = DERIVED_COLUMNS.len();
    console.success(&format!("Added {} derived columns", DERIVED_COLUMNS.len()));
    summary.record_time("features", step_start.elapsed());
    console.time(step_start.elapsed());

    // Step 4: Prune identifiers and encode the TLD
    console.step(4, "Prune & Encode");
    let step_start = Instant::now();
    let (df, dropped) = drop_identifier_columns(df);
    if dropped.is_empty() {
        console.info("No identifier columns present");
    } else {
        console.success(&format!("Removed {}", dropped.join(", ")));
    }
    summary.dropped_columns = dropped;

    let (df, encoder) = encode_tld(df)?;
    summary.tld_classes = encoder.len();
    console.count("distinct TLD value(s)", encoder.len(), Some("(encoded as tld_encoded)"));
    summary.record_time("prune_encode", step_start.elapsed());
    console.time(step_start.elapsed());

    // Step 5: Balance
    console.step(5, "Class Balancing");
    let step_start = Instant::now();
    let spinner = console.spinner("Oversampling minority classes...");
    let balanced = balance_classes(&df, config)?;
    drop(df);
    console.finish(&spinner, "Classes balanced");
    if balanced.k_forced && config.k_neighbors != balanced.k_neighbors {
        console.warning(&format!(
            "k_neighbors forced from {} to {} for a 2-row minority class",
            config.k_neighbors, balanced.k_neighbors
        ));
    }
    console.count("synthetic row(s)", balanced.synthetic_rows(), None);
    summary.k_neighbors = balanced.k_neighbors;
    summary.k_forced = balanced.k_forced;
    summary.class_counts_before = balanced.counts_before.clone();
    summary.class_counts_after = balanced.counts_after.clone();
    summary.synthetic_rows = balanced.synthetic_rows();
    summary.final_features = balanced.features.width();
    summary.record_time("balance", step_start.elapsed());
    console.time(step_start.elapsed());

    // Step 6: Split and persist
    console.step(6, "Split & Save");
    let step_start = Instant::now();
    let split = train_test_split(&balanced, TEST_FRACTION, SPLIT_SEED)?;
    summary.train_rows = split.train_len();
    summary.test_rows = split.test_len();

    let spinner = console.spinner("Writing artifacts...");
    let artifacts = persist_artifacts(output_dir, &balanced, &encoder)?;
    let manifest = RunManifest::new(input, config, &summary, &artifacts).write(output_dir)?;
    console.finish(&spinner, &format!("Saved to {}", output_dir.display()));
    summary.record_time("split_persist", step_start.elapsed());
    console.time(step_start.elapsed());

    Ok(PipelineOutput {
        split,
        encoder,
        artifacts,
        manifest,
        summary,
    })
}
