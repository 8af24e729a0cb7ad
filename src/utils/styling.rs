//! Terminal styling utilities for step-by-step console output

use std::path::Path;
use std::time::Duration;

use console::{style, Emoji};
use indicatif::ProgressBar;

use super::progress::{create_spinner, finish_with_success};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static SCALE: Emoji<'_, '_> = Emoji("⚖️  ", "");
pub static SEED: Emoji<'_, '_> = Emoji("🌱 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ___ _    _    _
    | _ \ |_ (_)__| |_  _ __ _ _ ___ _ __
    |  _/ ' \| (_-< ' \| '_ \ '_/ -_) '_ \
    |_| |_||_|_/__/_||_| .__/_| \___| .__/
                       |_|          |_|
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Feature engineering and class balancing for phishing URL data").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(
    input: &Path,
    output_dir: &Path,
    seed: u64,
    k_neighbors: usize,
    sampling_strategy: &str,
) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:  {:<39}│",
        FOLDER,
        truncate_path(input, 38)
    );
    println!(
        "    │  {} Output: {:<39}│",
        SAVE,
        truncate_path(output_dir, 38)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Seed:              {:<28}│",
        SEED,
        style(seed).yellow()
    );
    println!(
        "    │  {} Neighbors / plan:  {:<28}│",
        SCALE,
        style(format!("k={} {}", k_neighbors, sampling_strategy)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print the time a step took
pub fn print_step_time(elapsed: Duration) {
    println!(
        "    {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Preprocessing complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!(
            "      Found {} {}",
            style(count).yellow().bold(),
            description
        );
    }
}

/// Step-by-step console reporter that can be silenced.
///
/// Library callers run quiet; the binary enables it.
#[derive(Debug, Clone, Copy)]
pub struct StepConsole {
    enabled: bool,
}

impl StepConsole {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn step(&self, step_num: u8, title: &str) {
        if self.enabled {
            print_step_header(step_num, title);
        }
    }

    pub fn success(&self, message: &str) {
        if self.enabled {
            print_success(message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.enabled {
            print_info(message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.enabled {
            print_warning(message);
        }
    }

    pub fn count(&self, description: &str, count: usize, detail: Option<&str>) {
        if self.enabled {
            print_count(description, count, detail);
        }
    }

    pub fn time(&self, elapsed: Duration) {
        if self.enabled {
            print_step_time(elapsed);
        }
    }

    /// Spinner for an indeterminate stage; hidden when silenced
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.enabled {
            create_spinner(message)
        } else {
            ProgressBar::hidden()
        }
    }

    pub fn finish(&self, pb: &ProgressBar, message: &str) {
        if self.enabled {
            finish_with_success(pb, message);
        } else {
            pb.finish_and_clear();
        }
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let tail: String = s
            .chars()
            .rev()
            .take(max_len - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_strings() {
        assert_eq!(truncate_string("data.csv", 38), "data.csv");
    }

    #[test]
    fn test_truncate_keeps_tail() {
        let truncated = truncate_string("/very/long/path/to/some/dataset.csv", 15);
        assert_eq!(truncated.chars().count(), 15);
        assert!(truncated.starts_with("..."));
        assert!(truncated.ends_with("dataset.csv"));
    }
}
