//! Preprocessing summary report generation

use std::collections::BTreeMap;
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

/// Counts collected while the pipeline runs
#[derive(Debug, Default, Clone)]
pub struct PreprocessSummary {
    pub rows_loaded: usize,
    pub columns_loaded: usize,
    pub missing_labels: usize,
    pub derived_columns: usize,
    pub dropped_columns: Vec<String>,
    pub tld_classes: usize,
    pub k_neighbors: usize,
    pub k_forced: bool,
    pub class_counts_before: BTreeMap<i64, usize>,
    pub class_counts_after: BTreeMap<i64, usize>,
    pub synthetic_rows: usize,
    pub final_features: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub timings: Vec<(String, Duration)>,
}

impl PreprocessSummary {
    pub fn new(rows_loaded: usize, columns_loaded: usize) -> Self {
        Self {
            rows_loaded,
            columns_loaded,
            ..Default::default()
        }
    }

    pub fn record_time(&mut self, step: &str, elapsed: Duration) {
        self.timings.push((step.to_string(), elapsed));
    }

    pub fn total_time(&self) -> Duration {
        self.timings.iter().map(|(_, d)| *d).sum()
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("PREPROCESSING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Rows Loaded"),
            Cell::new(self.rows_loaded),
        ]);

        table.add_row(vec![
            Cell::new("🗑️  Dropped (Missing Label)"),
            Cell::new(self.missing_labels).fg(if self.missing_labels == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        table.add_row(vec![
            Cell::new("🧪 Derived Columns"),
            Cell::new(self.derived_columns),
        ]);

        table.add_row(vec![
            Cell::new("✂️  Identifier Columns Removed"),
            Cell::new(self.dropped_columns.len()),
        ]);

        table.add_row(vec![
            Cell::new("🏷️  TLD Codes"),
            Cell::new(self.tld_classes),
        ]);

        table.add_row(vec![
            Cell::new("⚖️  Classes Before"),
            Cell::new(format_counts(&self.class_counts_before)),
        ]);

        table.add_row(vec![
            Cell::new("⚖️  Classes After"),
            Cell::new(format_counts(&self.class_counts_after)).fg(Color::Green),
        ]);

        table.add_row(vec![
            Cell::new("🧬 Synthetic Rows"),
            Cell::new(format!("{} (k={})", self.synthetic_rows, self.k_neighbors)),
        ]);

        table.add_row(vec![
            Cell::new("✅ Final Features"),
            Cell::new(self.final_features)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📊 Train / Test"),
            Cell::new(format!("{} / {}", self.train_rows, self.test_rows))
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.dropped_columns.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Removed Identifiers").yellow(),
                style(format!("({})", self.dropped_columns.len())).dim()
            );
            for column in &self.dropped_columns {
                println!("        {} {}", style("•").dim(), column);
            }
        }

        if !self.timings.is_empty() {
            println!();
            println!(
                "      {} {:.2}s",
                style("Total time:").dim(),
                self.total_time().as_secs_f64()
            );
        }
    }
}

/// Render class counts as `0: 3, 1: 3`
pub fn format_counts(counts: &BTreeMap<i64, usize>) -> String {
    counts
        .iter()
        .map(|(label, count)| format!("{}: {}", label, count))
        .collect::<Vec<_>>()
        .join(", ")
}
