//! Unit tests for dataset loader

use phishprep::pipeline::{load_dataset, PipelineError};
use polars::prelude::*;
use std::io::Write;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_load_csv_preserves_columns_and_row_order() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "URL,label,TLD").unwrap();
    writeln!(file, "https://c.com,0,com").unwrap();
    writeln!(file, "https://a.xyz,1,xyz").unwrap();
    writeln!(file, "https://b.net,0,net").unwrap();
    drop(file);

    let df = load_dataset(&csv_path, 100).unwrap();

    assert_eq!(df.shape(), (3, 3));
    assert_eq!(common::column_names(&df), vec!["URL", "label", "TLD"]);

    let urls: Vec<String> = df
        .column("URL")
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(String::from)
        .collect();
    assert_eq!(urls, vec!["https://c.com", "https://a.xyz", "https://b.net"]);
}

#[test]
fn test_load_parquet_file() {
    let mut df = common::create_phishing_sample();
    let (_temp_dir, parquet_path) = common::create_temp_parquet(&mut df);

    let loaded = load_dataset(&parquet_path, 100).unwrap();

    assert_eq!(loaded.shape(), df.shape());
    assert_eq!(common::column_names(&loaded), common::column_names(&df));
}

#[test]
fn test_nonexistent_file_is_dataset_not_found() {
    let path = std::path::Path::new("/nonexistent/path/to/full_sample.csv");

    let err = load_dataset(path, 100).unwrap_err();

    assert_eq!(
        err.downcast_ref::<PipelineError>(),
        Some(&PipelineError::DatasetNotFound {
            path: path.to_path_buf()
        })
    );
    assert!(err.to_string().contains("Dataset not found"));
}

#[test]
fn test_unsupported_format() {
    let temp_dir = TempDir::new().unwrap();
    let bad_path = temp_dir.path().join("test.xlsx");
    std::fs::File::create(&bad_path).unwrap();

    let err = load_dataset(&bad_path, 100).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_csv_with_missing_values_keeps_rows() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("missing.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "URL,Domain,label").unwrap();
    writeln!(file, "https://a.com,a.com,0").unwrap();
    writeln!(file, ",b.com,").unwrap();
    writeln!(file, "https://c.com,,1").unwrap();
    drop(file);

    let df = load_dataset(&csv_path, 100).unwrap();

    assert_eq!(df.height(), 3);
    assert_eq!(df.column("label").unwrap().null_count(), 1);
    assert_eq!(df.column("URL").unwrap().null_count(), 1);
    assert_eq!(df.column("Domain").unwrap().null_count(), 1);
}
