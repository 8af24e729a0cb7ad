//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Five-row phishing sample carrying every raw column of the source data.
///
/// Labels are `[0, 1, 1, 0, 0]`: three legitimate rows and two phishing rows.
pub fn create_phishing_sample() -> DataFrame {
    df! {
        "FILENAME" => ["safe1.html", "phish1.html", "phish2.html", "safe2.html", "safe3.html"],
        "URL" => [
            "https://bank.com/login?user=123&session=abc",
            "http://phish-paypal.xyz:8080/auth?id=456",
            "http://steal-info.xyz/login.php?session=hijack",
            "https://secure-portal.net/dashboard",
            "https://bank2.com/dashboard?acct=789&token=xyz",
        ],
        "Domain" => ["bank.com", "phish-paypal.xyz", "steal-info.xyz", "secure-portal.net", "bank2.com"],
        "Title" => [
            "Bank Login Portal",
            "Account Verification Required",
            "Update Your Credentials",
            "Secure Dashboard",
            "Bank2 Dashboard",
        ],
        "URLLength" => [38i64, 45, 52, 28, 40],
        "DomainLength" => [8i64, 16, 15, 15, 9],
        "IsDomainIP" => [0i64, 0, 0, 0, 0],
        "TLD" => ["com", "xyz", "xyz", "net", "com"],
        "URLSimilarityIndex" => [0.95f64, 0.35, 0.28, 0.92, 0.93],
        "CharContinuationRate" => [0.07f64, 0.42, 0.38, 0.06, 0.05],
        "TLDLegitimateProb" => [0.98f64, 0.15, 0.12, 0.97, 0.96],
        "NoOfSubDomain" => [1i64, 2, 1, 1, 1],
        "HasObfuscation" => [0i64, 1, 1, 0, 0],
        "NoOfObfuscatedChar" => [0i64, 7, 9, 0, 0],
        "ObfuscationRatio" => [0.0f64, 0.28, 0.35, 0.0, 0.0],
        "NoOfDegitsInURL" => [3i64, 3, 0, 2, 3],
        "IsHTTPS" => [1i64, 0, 0, 1, 1],
        "DomainTitleMatchScore" => [0.92f64, 0.28, 0.25, 0.90, 0.91],
        "URLTitleMatchScore" => [0.90f64, 0.25, 0.22, 0.88, 0.89],
        "NoOfURLRedirect" => [0i64, 4, 3, 0, 0],
        "HasPasswordField" => [1i64, 1, 1, 0, 0],
        "NoOfExternalRef" => [2i64, 9, 7, 1, 2],
        "label" => [0i64, 1, 1, 0, 0],
    }
    .unwrap()
}

/// Three-row fixture for derived-feature checks.
///
/// Row 0 has two query parameters, row 1 none, row 2 a null URL and Domain.
pub fn create_feature_fixture() -> DataFrame {
    df! {
        "URL" => [
            Some("https://bank.com/login?user=1&session=abc"),
            Some("http://sub.shop-now.example.top/cart%20items"),
            None,
        ],
        "Domain" => [Some("bank.com"), Some("sub.shop-now.example.top"), None],
        "TLD" => ["com", "top", "org"],
        "DomainTitleMatchScore" => [0.9f64, 0.3, 0.5],
        "IsHTTPS" => [1i64, 0, 1],
        "ObfuscationRatio" => [0.0f64, 0.2, 0.1],
        "NoOfExternalRef" => [3i64, 5, 0],
        "URLLength" => [42i64, 45, 0],
        "label" => [0i64, 1, 0],
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Column names as owned strings
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols = column_names(df);
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols = column_names(df);
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// Count of each label value, sorted by label
pub fn label_counts(labels: &[i64]) -> Vec<(i64, usize)> {
    let mut counts = std::collections::BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0usize) += 1;
    }
    counts.into_iter().collect()
}

/// True when every label occurs equally often
pub fn is_balanced(labels: &[i64]) -> bool {
    let counts = label_counts(labels);
    counts.windows(2).all(|w| w[0].1 == w[1].1)
}

/// Read an i64 column into a vector
pub fn i64_values(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

/// Read an f64 column into a vector
pub fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}
