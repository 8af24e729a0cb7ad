//! Feature engineering - derived signal columns from raw URL records
//!
//! Every derived value is a pure function of one [`SignalRecord`]. The frame
//! level entry point validates the required columns once via
//! [`RawSignals::from_frame`] and appends the derived columns, leaving every
//! existing column in place.

use std::collections::HashMap;

use anyhow::Result;
use polars::prelude::*;

use super::schema::{RawSignals, SignalRecord};

/// TLDs treated as suspicious by `tld_suspicious`
pub const SUSPICIOUS_TLDS: [&str; 4] = ["xyz", "top", "cc", "tk"];

/// Substrings that mark a URL as pointing at a credential page
pub const LOGIN_KEYWORDS: [&str; 3] = ["login", "signin", "auth"];

/// `DomainTitleMatchScore` below this marks a brand mismatch
pub const BRAND_MISMATCH_THRESHOLD: f64 = 0.5;

/// Weights of the linear `risk_score` composite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskWeights {
    pub obfuscation_ratio: f64,
    pub url_entropy: f64,
    pub tld_suspicious: f64,
    pub brand_mismatch: f64,
}

pub const RISK_WEIGHTS: RiskWeights = RiskWeights {
    obfuscation_ratio: 0.3,
    url_entropy: 0.2,
    tld_suspicious: 0.2,
    brand_mismatch: 0.3,
};

pub const URL_ENTROPY: &str = "url_entropy";
pub const NUM_PARAMS: &str = "num_params";
pub const SUBDOMAIN_LEVEL: &str = "subdomain_level";
pub const TLD_SUSPICIOUS: &str = "tld_suspicious";
pub const HYPHEN_COUNT: &str = "hyphen_count";
pub const NUM_ENCODED_CHARS: &str = "num_encoded_chars";
pub const LOGIN_KEYWORD: &str = "login_keyword";
pub const BRAND_MISMATCH: &str = "brand_mismatch";
pub const MIXED_CONTENT: &str = "mixed_content";
pub const RISK_SCORE: &str = "risk_score";

/// Names of the columns added by [`engineer_features`], in insertion order
pub const DERIVED_COLUMNS: [&str; 10] = [
    URL_ENTROPY,
    NUM_PARAMS,
    SUBDOMAIN_LEVEL,
    TLD_SUSPICIOUS,
    HYPHEN_COUNT,
    NUM_ENCODED_CHARS,
    LOGIN_KEYWORD,
    BRAND_MISMATCH,
    MIXED_CONTENT,
    RISK_SCORE,
];

/// Shannon entropy (base 2) of the character distribution of `s`.
///
/// Depends only on the multiset of characters: the empty string and any
/// string made of a single repeated character both score 0.
pub fn calculate_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut len = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
        len += 1;
    }

    let n = len as f64;
    let entropy: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum();

    // A single symbol yields -0.0
    entropy.max(0.0)
}

/// Number of query parameters: 1 for the `?` plus every `&` after it
pub fn count_query_params(url: &str) -> usize {
    match url.find('?') {
        Some(pos) => 1 + url[pos + 1..].matches('&').count(),
        None => 0,
    }
}

/// Dots in the domain, a proxy for subdomain depth
pub fn subdomain_level(domain: &str) -> usize {
    domain.matches('.').count()
}

pub fn hyphen_count(domain: &str) -> usize {
    domain.matches('-').count()
}

/// Count `%XX` percent-encoded bytes (non-overlapping, left to right)
pub fn count_encoded_chars(url: &str) -> usize {
    let bytes = url.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i + 2 < bytes.len() {
        if bytes[i] == b'%' && bytes[i + 1].is_ascii_hexdigit() && bytes[i + 2].is_ascii_hexdigit() {
            count += 1;
            i += 3;
        } else {
            i += 1;
        }
    }
    count
}

pub fn has_login_keyword(url: &str) -> bool {
    let lower = url.to_lowercase();
    LOGIN_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn is_suspicious_tld(tld: Option<&str>) -> bool {
    tld.is_some_and(|t| SUSPICIOUS_TLDS.contains(&t))
}

/// Derived values for a single record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    pub url_entropy: f64,
    pub num_params: usize,
    pub subdomain_level: usize,
    pub tld_suspicious: bool,
    pub hyphen_count: usize,
    pub num_encoded_chars: usize,
    pub login_keyword: bool,
    pub brand_mismatch: bool,
    pub mixed_content: bool,
    pub risk_score: f64,
}

impl DerivedFeatures {
    pub fn from_record(record: &SignalRecord<'_>) -> Self {
        let url_entropy = calculate_entropy(record.url);
        let tld_suspicious = is_suspicious_tld(record.tld);
        let brand_mismatch = record.domain_title_match_score < BRAND_MISMATCH_THRESHOLD;
        let mixed_content = record.is_https && record.external_refs > 0.0;

        let risk_score = RISK_WEIGHTS.obfuscation_ratio * record.obfuscation_ratio
            + RISK_WEIGHTS.url_entropy * url_entropy
            + RISK_WEIGHTS.tld_suspicious * flag(tld_suspicious) as f64
            + RISK_WEIGHTS.brand_mismatch * flag(brand_mismatch) as f64;

        Self {
            url_entropy,
            num_params: count_query_params(record.url),
            subdomain_level: subdomain_level(record.domain),
            tld_suspicious,
            hyphen_count: hyphen_count(record.domain),
            num_encoded_chars: count_encoded_chars(record.url),
            login_keyword: has_login_keyword(record.url),
            brand_mismatch,
            mixed_content,
            risk_score,
        }
    }
}

/// Append the derived columns to `df`.
///
/// Takes ownership of the frame and returns it with ten extra columns; no
/// existing column is removed or modified.
pub fn engineer_features(mut df: DataFrame) -> Result<DataFrame> {
    let signals = RawSignals::from_frame(&df)?;
    let derived: Vec<DerivedFeatures> = signals
        .records()
        .map(|r| DerivedFeatures::from_record(&r))
        .collect();

    let floats = |f: fn(&DerivedFeatures) -> f64| -> Vec<f64> { derived.iter().map(f).collect() };
    let ints = |f: fn(&DerivedFeatures) -> i64| -> Vec<i64> { derived.iter().map(f).collect() };

    let columns = vec![
        Column::new(URL_ENTROPY.into(), floats(|d| d.url_entropy)),
        Column::new(NUM_PARAMS.into(), ints(|d| d.num_params as i64)),
        Column::new(SUBDOMAIN_LEVEL.into(), ints(|d| d.subdomain_level as i64)),
        Column::new(TLD_SUSPICIOUS.into(), ints(|d| flag(d.tld_suspicious))),
        Column::new(HYPHEN_COUNT.into(), ints(|d| d.hyphen_count as i64)),
        Column::new(NUM_ENCODED_CHARS.into(), ints(|d| d.num_encoded_chars as i64)),
        Column::new(LOGIN_KEYWORD.into(), ints(|d| flag(d.login_keyword))),
        Column::new(BRAND_MISMATCH.into(), ints(|d| flag(d.brand_mismatch))),
        Column::new(MIXED_CONTENT.into(), ints(|d| flag(d.mixed_content))),
        Column::new(RISK_SCORE.into(), floats(|d| d.risk_score)),
    ];

    for column in columns {
        df.with_column(column)?;
    }

    Ok(df)
}

fn flag(value: bool) -> i64 {
    i64::from(value)
}
