//! Phishprep: Phishing Dataset Preprocessing Library
//!
//! Turns a raw labeled table of URL/webpage attributes into a balanced,
//! numeric train/test split: derived URL signals, identifier pruning,
//! TLD encoding and synthetic minority oversampling.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
