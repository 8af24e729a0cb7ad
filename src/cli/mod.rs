//! CLI module - argument parsing and the encode subcommand

mod args;
pub mod encode;

pub use args::{Cli, Commands};
