//! Writing the processed artifacts to the output directory

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use rayon::prelude::*;

use super::balance::BalancedData;
use super::encoder::TldEncoder;

pub const PROCESSED_FILE: &str = "processed_data.csv";
pub const FEATURES_FILE: &str = "features.csv";
pub const TARGET_FILE: &str = "target.csv";
pub const ENCODER_FILE: &str = "tld_encoder.json";

/// Locations of the written artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub processed: PathBuf,
    pub features: PathBuf,
    pub target: PathBuf,
    pub encoder: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            processed: output_dir.join(PROCESSED_FILE),
            features: output_dir.join(FEATURES_FILE),
            target: output_dir.join(TARGET_FILE),
            encoder: output_dir.join(ENCODER_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [&self.processed, &self.features, &self.target, &self.encoder]
    }
}

/// Write the balanced tables and the encoder state under `output_dir`.
///
/// Every file is first written into a staging directory inside
/// `output_dir`, the three tables in parallel. Files are moved into place
/// only once all of them were written; if a move fails, the files already
/// moved are removed again so no partial artifact set is left behind.
pub fn persist_artifacts(
    output_dir: &Path,
    balanced: &BalancedData,
    encoder: &TldEncoder,
) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let staging = tempfile::Builder::new()
        .prefix(".phishprep-staging-")
        .tempdir_in(output_dir)
        .with_context(|| {
            format!("Failed to create staging directory in {}", output_dir.display())
        })?;
    let staged = ArtifactPaths::in_dir(staging.path());
    let paths = ArtifactPaths::in_dir(output_dir);

    let tables = vec![
        (staged.processed.clone(), balanced.to_frame()?),
        (staged.features.clone(), balanced.features.to_frame()?),
        (staged.target.clone(), balanced.target_frame()?),
    ];

    tables
        .into_par_iter()
        .map(|(path, mut df)| write_csv(&mut df, &path))
        .collect::<Result<Vec<()>>>()?;

    encoder.save(&staged.encoder)?;

    publish(&staged, &paths)?;
    Ok(paths)
}

/// Move staged files to their final names, all or nothing
fn publish(staged: &ArtifactPaths, paths: &ArtifactPaths) -> Result<()> {
    let moves: Vec<(&Path, &Path)> = staged.all().into_iter().zip(paths.all()).collect();

    // Fail before moving anything when a destination cannot be replaced
    if let Some((_, to)) = moves.iter().find(|(_, to)| to.is_dir()) {
        bail!("Cannot write artifact, a directory exists at {}", to.display());
    }

    for (i, (from, to)) in moves.iter().enumerate() {
        if let Err(e) = std::fs::rename(from, to) {
            for (_, moved) in &moves[..i] {
                let _ = std::fs::remove_file(moved);
            }
            return Err(e).with_context(|| format!("Failed to move artifact to {}", to.display()));
        }
    }
    Ok(())
}

/// Save a frame as CSV with a header row
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::balance::FeatureMatrix;
    use std::collections::BTreeMap;

    fn small_balanced() -> BalancedData {
        BalancedData {
            features: FeatureMatrix {
                columns: vec!["x".to_string()],
                rows: vec![vec![0.0], vec![1.0]],
            },
            target: vec![0, 1],
            k_neighbors: 1,
            k_forced: false,
            counts_before: BTreeMap::from([(0, 1), (1, 1)]),
            counts_after: BTreeMap::from([(0, 1), (1, 1)]),
        }
    }

    #[test]
    fn test_staging_directory_is_removed_after_success() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("out");

        persist_artifacts(&out, &small_balanced(), &TldEncoder::fit(["com"])).unwrap();

        let entries: Vec<String> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries.len(), 4, "unexpected entries: {:?}", entries);
        assert!(entries.iter().all(|e| !e.starts_with(".phishprep-staging-")));
    }
}
