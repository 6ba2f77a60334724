//! CLI module
//!
//! Command-line interface for conversions.
//!
//! # Commands
//!
//! - `to-parquet` - Convert canonical CSV to a typed Parquet file
//! - `to-csv` - Export a Parquet file as canonical CSV
//! - `metadata` - Show file key/value metadata
//! - `check` - Check whether a file can be read back
//! - `schema` - Show a physical schema
//! - `column` - Print one column's values

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
