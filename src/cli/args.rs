//! Command-line argument definitions using clap

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{
    BalancerConfig, SamplingStrategy, DEFAULT_INFER_SCHEMA_LENGTH, DEFAULT_K_NEIGHBORS,
    DEFAULT_SEED,
};

/// Phishprep - Engineer, encode and balance a phishing URL dataset
#[derive(Parser, Debug)]
#[command(name = "phishprep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet) with a `label` column
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for the processed tables and encoder state.
    /// Defaults to a `processed` directory next to the input file.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Random seed for synthetic oversampling
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Nearest same-class neighbors used to synthesize rows.
    /// Forced to 1 when the smallest class has exactly 2 rows.
    #[arg(long, default_value_t = DEFAULT_K_NEIGHBORS)]
    pub k_neighbors: usize,

    /// Which classes to oversample.
    /// Options: "auto" (default), "minority", "not-majority", "all"
    #[arg(long, default_value = "auto", value_parser = parse_sampling_strategy)]
    pub sampling_strategy: SamplingStrategy,

    /// Balancer configuration as a JSON object, e.g.
    /// '{"random_state": 42, "k_neighbors": 1, "sampling_strategy": "auto"}'.
    /// Keys present here override the individual flags.
    #[arg(long)]
    pub balancer_config: Option<String>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
    pub infer_schema_length: usize,

    /// Suppress step-by-step console output
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode TLD values with a previously saved encoder
    Encode {
        /// Encoder state written by a preprocessing run (tld_encoder.json)
        #[arg(short, long)]
        encoder: PathBuf,

        /// TLD values to encode
        #[arg(required = true)]
        tlds: Vec<String>,
    },
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Get the output directory, deriving it from the input if not explicitly provided.
    pub fn output_dir(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(self.output_dir.clone().unwrap_or_else(|| {
            let parent = input.parent().unwrap_or_else(|| std::path::Path::new("."));
            parent.join("processed")
        }))
    }

    /// Balancer configuration from the flags, then the JSON map on top
    pub fn balancer_config(&self) -> Result<BalancerConfig> {
        let config = BalancerConfig {
            seed: self.seed,
            k_neighbors: self.k_neighbors,
            sampling_strategy: self.sampling_strategy,
        };

        match &self.balancer_config {
            Some(json) => config.with_overrides_json(json),
            None => Ok(config),
        }
    }
}

fn parse_sampling_strategy(s: &str) -> Result<SamplingStrategy, String> {
    s.parse()
}
