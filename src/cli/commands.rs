//! CLI commands and argument parsing

use crate::config::CompressionCodec;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Canonical text to typed Parquet converter
#[derive(Parser, Debug)]
#[command(name = "canonparq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Conversion config file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for reports
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output (include per-row field errors in reports)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a canonical CSV file into a Parquet file
    ToParquet {
        /// Canonical CSV input
        input: PathBuf,

        /// Parquet file to create (replaced if it exists)
        output: PathBuf,

        /// Type-options XML declaring the fields
        #[arg(short, long)]
        type_options: PathBuf,

        /// Use the input table's columns instead of the published columns
        #[arg(long)]
        input_fields: bool,

        /// Input table name (first table when unset)
        #[arg(long)]
        table: Option<String>,

        /// First row is a header
        #[arg(long)]
        header: bool,

        /// Field separator
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Compression codec
        #[arg(long)]
        compression: Option<CompressionCodec>,

        /// Rows per row group
        #[arg(long)]
        row_group_size: Option<usize>,

        /// Do not record the conversion audit in the file
        #[arg(long)]
        no_audit: bool,

        /// Extra key/value metadata (KEY=VALUE, repeatable)
        #[arg(short, long = "metadata", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },

    /// Export a Parquet file as canonical CSV
    ToCsv {
        /// Parquet input
        input: PathBuf,

        /// Output file (stdout when unset)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum rows to export
        #[arg(long)]
        max_rows: Option<u64>,

        /// Maximum leading columns to export
        #[arg(long)]
        max_columns: Option<usize>,
    },

    /// Show file key/value metadata
    Metadata {
        /// Parquet input
        input: PathBuf,
    },

    /// Check whether a Parquet file can be read back
    Check {
        /// Parquet input
        input: PathBuf,
    },

    /// Show the physical schema of a type-options document or a Parquet file
    Schema {
        /// Type-options XML
        #[arg(short, long, conflicts_with = "parquet", required_unless_present = "parquet")]
        type_options: Option<PathBuf>,

        /// Parquet file
        #[arg(short, long)]
        parquet: Option<PathBuf>,

        /// Use the input table's columns instead of the published columns
        #[arg(long)]
        input_fields: bool,

        /// Input table name (first table when unset)
        #[arg(long)]
        table: Option<String>,
    },

    /// Print the values of one column
    Column {
        /// Parquet input
        input: PathBuf,

        /// Column name (`f0`, `f1`, ... for converted files)
        column: String,

        /// Maximum values to print
        #[arg(long)]
        limit: Option<u64>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse a `KEY=VALUE` pair
fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
