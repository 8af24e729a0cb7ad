//! Phishprep: Phishing Dataset Preprocessing CLI
//!
//! Loads a labeled table of URL attributes, derives signal columns, removes
//! identifiers, encodes the TLD, balances the classes and writes a
//! reproducible train/test-ready dataset.

use anyhow::Result;
use clap::Parser;
use console::style;

use phishprep::cli::{encode::run_encode, Cli, Commands};
use phishprep::pipeline::{run_pipeline, RunOptions};
use phishprep::utils::{print_banner, print_completion, print_config, print_info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Encode { encoder, tlds } => run_encode(encoder, tlds),
        };
    }

    // Main preprocessing pipeline - require input
    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;
    let output_dir = cli
        .output_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine the output directory"))?;
    let config = cli.balancer_config()?;
    let verbose = !cli.quiet;

    if verbose {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_config(
            input,
            &output_dir,
            config.seed,
            config.k_neighbors,
            &config.sampling_strategy.to_string(),
        );
    }

    let options = RunOptions {
        infer_schema_length: cli.infer_schema_length,
        verbose,
    };
    let output = run_pipeline(input, &output_dir, &config, &options)?;

    if verbose {
        output.summary.display();
        println!();
        for path in output.artifacts.all() {
            print_info(&format!("{}", style(path.display()).dim()));
        }
        print_info(&format!("{}", style(output.manifest.display()).dim()));
        print_completion();
    }

    Ok(())
}
