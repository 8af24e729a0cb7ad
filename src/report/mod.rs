//! Report module - run summary and manifest

pub mod manifest;
pub mod summary;

pub use manifest::*;
pub use summary::*;
