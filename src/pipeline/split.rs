//! Stratified train/test splitting of the balanced dataset

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::balance::{BalancedData, FeatureMatrix};

/// Share of each class held out for testing
pub const TEST_FRACTION: f64 = 0.2;

/// Seed used for the split so repeated runs produce identical partitions
pub const SPLIT_SEED: u64 = 42;

/// The four partitions handed back to the caller
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Vec<i64>,
    pub y_test: Vec<i64>,
}

impl TrainTestSplit {
    pub fn train_len(&self) -> usize {
        self.y_train.len()
    }

    pub fn test_len(&self) -> usize {
        self.y_test.len()
    }
}

/// Rows of one class held out for testing: `ceil(count * fraction)`, kept
/// within `1..count` so both partitions see every class with 2+ rows.
pub fn test_count_for_class(count: usize, test_fraction: f64) -> usize {
    if count < 2 {
        return 0;
    }
    let raw = (count as f64 * test_fraction).ceil() as usize;
    raw.clamp(1, count - 1)
}

/// Row indices for the train and test partitions.
///
/// Each class contributes the same share of its rows to the test set, so a
/// balanced input yields balanced partitions. Both index lists are shuffled.
pub fn stratified_indices(
    target: &[i64],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_fraction) {
        bail!("test fraction must be in [0, 1), got {}", test_fraction);
    }

    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in target.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(target.len());
    let mut test = Vec::new();

    for (_, mut indices) in by_class {
        indices.shuffle(&mut rng);
        let n_test = test_count_for_class(indices.len(), test_fraction);
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok((train, test))
}

/// Split balanced features and target into train/test partitions
pub fn train_test_split(
    balanced: &BalancedData,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    split_matrix(&balanced.features, &balanced.target, test_fraction, seed)
}

fn split_matrix(
    features: &FeatureMatrix,
    target: &[i64],
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if features.height() != target.len() {
        bail!(
            "Feature matrix has {} rows but target has {}",
            features.height(),
            target.len()
        );
    }

    let (train, test) = stratified_indices(target, test_fraction, seed)?;

    Ok(TrainTestSplit {
        x_train: features.select_rows(&train).to_frame()?,
        x_test: features.select_rows(&test).to_frame()?,
        y_train: train.iter().map(|&i| target[i]).collect(),
        y_test: test.iter().map(|&i| target[i]).collect(),
    })
}
