//! Class balancing via synthetic minority oversampling (SMOTE)
//!
//! Rows of under-represented classes are synthesized by interpolating between
//! a real row and one of its nearest same-class neighbors. Before any row is
//! generated the minority class size is checked:
//!
//! - `m < 2`: oversampling is impossible, the run fails with `ClassTooSmall`
//! - `m == 2`: the neighbor count is forced to 1
//! - `m > 2`: the configured neighbor count is used

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::schema::LABEL_COLUMN;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_K_NEIGHBORS: usize = 5;

/// Which classes receive synthetic rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingStrategy {
    /// Every class except the majority (same as `NotMajority`)
    #[default]
    Auto,
    /// Only the smallest class; limited to two-class data
    Minority,
    /// Every class except the majority
    #[serde(alias = "not majority", alias = "not_majority")]
    NotMajority,
    /// Every class; the majority is already at the target count
    All,
}

impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SamplingStrategy::Auto => "auto",
            SamplingStrategy::Minority => "minority",
            SamplingStrategy::NotMajority => "not-majority",
            SamplingStrategy::All => "all",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SamplingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', ' '], "-").as_str() {
            "auto" => Ok(SamplingStrategy::Auto),
            "minority" => Ok(SamplingStrategy::Minority),
            "not-majority" => Ok(SamplingStrategy::NotMajority),
            "all" => Ok(SamplingStrategy::All),
            _ => Err(format!(
                "Unknown sampling strategy '{}'. Options: auto, minority, not-majority, all",
                s
            )),
        }
    }
}

/// Oversampler configuration supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancerConfig {
    /// Seed for the sample/neighbor/gap draws
    pub seed: u64,
    /// Nearest same-class neighbors considered per synthetic row
    pub k_neighbors: usize,
    pub sampling_strategy: SamplingStrategy,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            k_neighbors: DEFAULT_K_NEIGHBORS,
            sampling_strategy: SamplingStrategy::Auto,
        }
    }
}

/// Keys accepted in a JSON configuration map; absent keys keep their value
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BalancerOverrides {
    #[serde(alias = "random_state")]
    seed: Option<u64>,
    k_neighbors: Option<usize>,
    sampling_strategy: Option<SamplingStrategy>,
}

impl BalancerConfig {
    /// Apply a JSON object such as `{"random_state": 42, "k_neighbors": 1}`
    pub fn with_overrides_json(self, json: &str) -> Result<Self> {
        let overrides: BalancerOverrides =
            serde_json::from_str(json).context("Invalid balancer configuration")?;

        Ok(Self {
            seed: overrides.seed.unwrap_or(self.seed),
            k_neighbors: overrides.k_neighbors.unwrap_or(self.k_neighbors),
            sampling_strategy: overrides.sampling_strategy.unwrap_or(self.sampling_strategy),
        })
    }
}

/// Dense row-major numeric matrix with named columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Collect every column except `exclude` as f64.
    ///
    /// Non-numeric columns and null values are rejected.
    pub fn from_frame(df: &DataFrame, exclude: &str) -> Result<Self> {
        let mut columns = Vec::new();
        let mut values: Vec<Vec<f64>> = Vec::new();

        for column in df.get_columns() {
            let name = column.name().to_string();
            if name == exclude {
                continue;
            }

            if !column.dtype().is_primitive_numeric() && column.dtype() != &DataType::Boolean {
                return Err(PipelineError::invalid_column(
                    &name,
                    format!("expected a numeric feature, found {}", column.dtype()),
                )
                .into());
            }

            let as_float = column.cast(&DataType::Float64)?;
            let col_values: Vec<Option<f64>> = as_float.f64()?.into_iter().collect();
            if let Some(row) = col_values.iter().position(Option::is_none) {
                return Err(PipelineError::invalid_column(
                    &name,
                    format!("null value at row {}", row),
                )
                .into());
            }

            columns.push(name);
            values.push(col_values.into_iter().flatten().collect());
        }

        let rows = (0..df.height())
            .map(|i| values.iter().map(|col| col[i]).collect())
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// New matrix holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let values: Vec<f64> = self.rows.iter().map(|row| row[j]).collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Split a frame into the feature matrix and the integer label vector
pub fn split_features_target(df: &DataFrame) -> Result<(FeatureMatrix, Vec<i64>)> {
    let label = df
        .column(LABEL_COLUMN)
        .map_err(|_| PipelineError::missing_column(LABEL_COLUMN))?;

    // A float cast to Int64 truncates, so fractional labels are rejected first
    if label.dtype().is_float() {
        let as_float = label.cast(&DataType::Float64)?;
        if let Some(value) = as_float
            .f64()?
            .into_iter()
            .flatten()
            .find(|v| v.fract() != 0.0)
        {
            return Err(PipelineError::invalid_column(
                LABEL_COLUMN,
                format!("label {} is not an integer class", value),
            )
            .into());
        };
    }

    let as_int = label
        .cast(&DataType::Int64)
        .map_err(|e| PipelineError::invalid_column(LABEL_COLUMN, e.to_string()))?;
    let target: Vec<Option<i64>> = as_int.i64()?.into_iter().collect();
    if target.iter().any(Option::is_none) {
        return Err(PipelineError::invalid_column(
            LABEL_COLUMN,
            "labels must be non-null integers",
        )
        .into());
    }

    let features = FeatureMatrix::from_frame(df, LABEL_COLUMN)?;
    Ok((features, target.into_iter().flatten().collect()))
}

/// Rows per label, ordered by label
pub fn class_counts(target: &[i64]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &label in target {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Smallest class as `(label, count)`; ties resolve to the lowest label
pub fn minority_class(counts: &BTreeMap<i64, usize>) -> Option<(i64, usize)> {
    counts
        .iter()
        .min_by_key(|(_, &count)| count)
        .map(|(&label, &count)| (label, count))
}

/// True when the smallest class has exactly two rows, which forces `k = 1`
pub fn forces_single_neighbor(counts: &BTreeMap<i64, usize>) -> bool {
    minority_class(counts).is_some_and(|(_, count)| count == 2)
}

/// Neighbor count to use after applying the minority size policy
pub fn resolve_k_neighbors(counts: &BTreeMap<i64, usize>, config: &BalancerConfig) -> Result<usize> {
    if config.k_neighbors == 0 {
        bail!("k_neighbors must be at least 1");
    }

    let Some((class, count)) = minority_class(counts) else {
        return Err(PipelineError::EmptyDataset.into());
    };

    match count {
        0 | 1 => Err(PipelineError::ClassTooSmall { class, count }.into()),
        2 => Ok(1),
        _ => Ok(config.k_neighbors),
    }
}

/// Output of the balancer
#[derive(Debug, Clone)]
pub struct BalancedData {
    pub features: FeatureMatrix,
    pub target: Vec<i64>,
    /// Neighbor count actually used (after the safety policy)
    pub k_neighbors: usize,
    /// Set when a two-row minority class forced the neighbor count to 1
    pub k_forced: bool,
    pub counts_before: BTreeMap<i64, usize>,
    pub counts_after: BTreeMap<i64, usize>,
}

impl BalancedData {
    /// Number of synthetic rows appended
    pub fn synthetic_rows(&self) -> usize {
        self.target.len() - self.counts_before.values().sum::<usize>()
    }

    /// Features with the label appended as the last column
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut df = self.features.to_frame()?;
        df.with_column(Column::new(LABEL_COLUMN.into(), self.target.clone()))?;
        Ok(df)
    }

    pub fn target_frame(&self) -> Result<DataFrame> {
        Ok(DataFrame::new(vec![Column::new(
            LABEL_COLUMN.into(),
            self.target.clone(),
        )])?)
    }
}

/// Balance a frame holding numeric features and a `label` column
pub fn balance_classes(df: &DataFrame, config: &BalancerConfig) -> Result<BalancedData> {
    let (features, target) = split_features_target(df)?;
    oversample(features, target, config)
}

/// Oversample the classes selected by the sampling strategy up to the
/// majority count.
///
/// Original rows keep their order; synthetic rows are appended grouped by
/// class in ascending label order.
pub fn oversample(
    features: FeatureMatrix,
    target: Vec<i64>,
    config: &BalancerConfig,
) -> Result<BalancedData> {
    if target.is_empty() {
        return Err(PipelineError::EmptyDataset.into());
    }
    if features.height() != target.len() {
        bail!(
            "Feature matrix has {} rows but target has {}",
            features.height(),
            target.len()
        );
    }

    let counts_before = class_counts(&target);

    // Nothing to balance against
    if counts_before.len() < 2 {
        return Ok(BalancedData {
            features,
            target,
            k_neighbors: config.k_neighbors,
            k_forced: false,
            counts_after: counts_before.clone(),
            counts_before,
        });
    }

    if config.sampling_strategy == SamplingStrategy::Minority && counts_before.len() > 2 {
        return Err(PipelineError::UnsupportedStrategy {
            strategy: config.sampling_strategy,
            classes: counts_before.len(),
        }
        .into());
    }

    let k = resolve_k_neighbors(&counts_before, config)?;
    let k_forced = forces_single_neighbor(&counts_before);
    let majority = counts_before.values().copied().max().unwrap_or(0);
    let targets: Vec<i64> = classes_to_resample(&counts_before, config.sampling_strategy)
        .into_iter()
        .filter(|class| counts_before[class] < majority)
        .collect();

    for &class in &targets {
        let count = counts_before[&class];
        if count < 2 {
            return Err(PipelineError::ClassTooSmall { class, count }.into());
        }
        if count <= k {
            return Err(PipelineError::InvalidNeighborCount {
                k_neighbors: k,
                class,
                count,
            }
            .into());
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut features = features;
    let mut target = target;

    for class in targets {
        let n_new = majority - counts_before[&class];
        let members: Vec<usize> = (0..target.len())
            .filter(|&i| target[i] == class)
            .collect();
        let neighbors = nearest_neighbors(&features.rows, &members, k);

        for _ in 0..n_new {
            let pick = rng.gen_range(0..members.len());
            let neighbor = neighbors[pick][rng.gen_range(0..k)];
            let gap: f64 = rng.gen();

            let base = &features.rows[members[pick]];
            let other = &features.rows[neighbor];
            let synthetic: Vec<f64> = base
                .iter()
                .zip(other)
                .map(|(a, b)| a + gap * (b - a))
                .collect();

            features.rows.push(synthetic);
            target.push(class);
        }
    }

    let counts_after = class_counts(&target);

    Ok(BalancedData {
        features,
        target,
        k_neighbors: k,
        k_forced,
        counts_before,
        counts_after,
    })
}

fn classes_to_resample(counts: &BTreeMap<i64, usize>, strategy: SamplingStrategy) -> Vec<i64> {
    let majority_label = counts
        .iter()
        .max_by_key(|(_, &count)| count)
        .map(|(&label, _)| label);

    match strategy {
        SamplingStrategy::Auto | SamplingStrategy::NotMajority => counts
            .keys()
            .copied()
            .filter(|&label| Some(label) != majority_label)
            .collect(),
        SamplingStrategy::Minority => minority_class(counts)
            .map(|(label, _)| vec![label])
            .unwrap_or_default(),
        SamplingStrategy::All => counts.keys().copied().collect(),
    }
}

/// For each member row, the `k` closest other members by Euclidean distance.
/// Ties resolve to the earlier row.
fn nearest_neighbors(rows: &[Vec<f64>], members: &[usize], k: usize) -> Vec<Vec<usize>> {
    members
        .iter()
        .map(|&i| {
            let mut candidates: Vec<(f64, usize)> = members
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| (squared_distance(&rows[i], &rows[j]), j))
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            candidates.into_iter().take(k).map(|(_, j)| j).collect()
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        FeatureMatrix {
            columns: (0..width).map(|i| format!("f{}", i)).collect(),
            rows,
        }
    }

    #[test]
    fn test_policy_forces_one_neighbor_for_two_minority_rows() {
        let counts = BTreeMap::from([(0, 3), (1, 2)]);
        let config = BalancerConfig::default();
        assert_eq!(resolve_k_neighbors(&counts, &config).unwrap(), 1);
    }

    #[test]
    fn test_policy_rejects_single_row_class() {
        let counts = BTreeMap::from([(0, 4), (1, 1)]);
        let err = resolve_k_neighbors(&counts, &BalancerConfig::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PipelineError>(),
            Some(&PipelineError::ClassTooSmall { class: 1, count: 1 })
        );
    }

    #[test]
    fn test_policy_keeps_configured_neighbors_above_two() {
        let counts = BTreeMap::from([(0, 10), (1, 3)]);
        let config = BalancerConfig {
            k_neighbors: 2,
            ..Default::default()
        };
        assert_eq!(resolve_k_neighbors(&counts, &config).unwrap(), 2);
    }

    #[test]
    fn test_oversample_equalizes_and_appends() {
        let features = matrix(vec![
            vec![0.0, 0.0],
            vec![10.0, 10.0],
            vec![1.0, 1.0],
            vec![11.0, 11.0],
            vec![12.0, 12.0],
        ]);
        let target = vec![0, 1, 0, 1, 1];

        let balanced = oversample(features.clone(), target.clone(), &BalancerConfig::default()).unwrap();

        assert_eq!(balanced.counts_after, BTreeMap::from([(0, 3), (1, 3)]));
        assert_eq!(balanced.k_neighbors, 1);
        assert_eq!(balanced.synthetic_rows(), 1);
        assert_eq!(&balanced.features.rows[..5], &features.rows[..]);
        assert_eq!(&balanced.target[..5], &target[..]);

        // The synthetic row lies on the segment between the two class-0 rows
        let synthetic = &balanced.features.rows[5];
        assert_eq!(balanced.target[5], 0);
        assert!(synthetic[0] >= 0.0 && synthetic[0] <= 1.0);
        assert!((synthetic[0] - synthetic[1]).abs() < 1e-12);
    }

    #[test]
    fn test_oversample_is_deterministic_for_a_seed() {
        let rows: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, (i * i) as f64]).collect();
        let target = vec![0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1];
        let config = BalancerConfig {
            k_neighbors: 2,
            ..Default::default()
        };

        let a = oversample(matrix(rows.clone()), target.clone(), &config).unwrap();
        let b = oversample(matrix(rows), target, &config).unwrap();
        assert_eq!(a.features, b.features);
    }

    #[test]
    fn test_neighbor_count_must_be_below_class_size() {
        let rows: Vec<Vec<f64>> = (0..7).map(|i| vec![i as f64]).collect();
        let target = vec![0, 0, 0, 0, 1, 1, 1];

        let err = oversample(matrix(rows), target, &BalancerConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidNeighborCount { class: 1, count: 3, .. })
        ));
    }

    #[test]
    fn test_single_class_passes_through() {
        let balanced = oversample(
            matrix(vec![vec![1.0], vec![2.0]]),
            vec![1, 1],
            &BalancerConfig::default(),
        )
        .unwrap();
        assert_eq!(balanced.target, vec![1, 1]);
        assert_eq!(balanced.synthetic_rows(), 0);
    }

    #[test]
    fn test_overrides_json_accepts_random_state_alias() {
        let config = BalancerConfig::default()
            .with_overrides_json(r#"{"random_state": 7, "k_neighbors": 1, "sampling_strategy": "auto"}"#)
            .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.k_neighbors, 1);
        assert_eq!(config.sampling_strategy, SamplingStrategy::Auto);

        assert!(BalancerConfig::default()
            .with_overrides_json(r#"{"neighbours": 3}"#)
            .is_err());
    }

    #[test]
    fn test_forced_flag_only_for_two_row_minority() {
        let features = matrix(vec![vec![0.0], vec![1.0], vec![5.0], vec![6.0], vec![7.0]]);
        let balanced =
            oversample(features, vec![0, 0, 1, 1, 1], &BalancerConfig::default()).unwrap();
        assert!(balanced.k_forced);

        // A configured k of 1 is not a forced one
        let rows: Vec<Vec<f64>> = (0..7).map(|i| vec![i as f64]).collect();
        let config = BalancerConfig {
            k_neighbors: 1,
            ..Default::default()
        };
        let balanced = oversample(matrix(rows), vec![0, 0, 0, 0, 1, 1, 1], &config).unwrap();
        assert!(!balanced.k_forced);
        assert_eq!(balanced.k_neighbors, 1);
    }

    #[test]
    fn test_sampling_strategy_parsing() {
        assert_eq!("not_majority".parse::<SamplingStrategy>(), Ok(SamplingStrategy::NotMajority));
        assert_eq!("Minority".parse::<SamplingStrategy>(), Ok(SamplingStrategy::Minority));
        assert!("sideways".parse::<SamplingStrategy>().is_err());
    }
}
