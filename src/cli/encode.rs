//! Encoding new TLD values with a persisted encoder

use std::path::Path;

use anyhow::Result;
use console::style;

use crate::pipeline::TldEncoder;

/// Look up codes for `tlds`; unknown values map to `None`
pub fn encode_values(encoder: &TldEncoder, tlds: &[String]) -> Vec<(String, Option<u32>)> {
    tlds.iter()
        .map(|tld| (tld.clone(), encoder.encode(tld)))
        .collect()
}

/// Load the encoder at `encoder_path` and print one line per TLD
pub fn run_encode(encoder_path: &Path, tlds: &[String]) -> Result<()> {
    let encoder = TldEncoder::load(encoder_path)?;

    println!(
        "\n {} Encoding with {} ({} known TLDs)",
        style("◆").cyan().bold(),
        style(encoder_path.display()).dim(),
        encoder.len()
    );
    println!();

    for (tld, code) in encode_values(&encoder, tlds) {
        match code {
            Some(code) => println!("   {:<16} {}", tld, style(code).green().bold()),
            None => println!("   {:<16} {}", tld, style("unknown").yellow()),
        }
    }
    println!();

    Ok(())
}
