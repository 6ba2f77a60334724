// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # canonparq
//!
//! Converts flat canonical text rows into typed, schema-described Parquet
//! files and back, recording per-field conversion failures in the file
//! instead of aborting the job.
//!
//! ## Features
//!
//! - **Schema derivation**: declared types (`varchar`, `integer`, `double`,
//!   `number(p,s)`, `date`, `timestamp`, `time`) to nullable Parquet columns
//! - **Canonical codec**: exact decimal truncation, millisecond timestamps,
//!   time-of-day values, shortest-form doubles
//! - **Audited writer**: failed fields are stored as null and reported per
//!   row in the file's key/value metadata
//! - **Readers**: a streaming single-column reader and a batch row reader
//! - **Bulk conversion**: canonical CSV streams to Parquet and back
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use canonparq::{AuditedWriter, FieldMetadata, WriterConfig, Result};
//!
//! fn main() -> Result<()> {
//!     let fields = vec![
//!         FieldMetadata::new("id", "integer"),
//!         FieldMetadata::new("price", "number(10,2)"),
//!     ];
//!     let mut writer = AuditedWriter::create(&fields, "out.parquet", WriterConfig::new())?;
//!     writer.write(&["1", "12.345"])?;
//!     writer.write(&["2", "oops"])?;
//!
//!     let result = writer.close()?.expect("auditing is on by default");
//!     println!("{} of {} rows failed", result.failure_count, result.total_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  CSV source  │   │ type options │   │   Convert    │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        │ rows             │ fields           │
//! ┌──────┴──────────────────┴──────────────────┴───────┐
//! │ Schema ─ Codec ─ Audited Writer │ Column/Row Reader │
//! └──────────────────────────┬─────────────────────────┘
//!                            │
//!                     parquet crate
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Writer and conversion configuration
pub mod config;

/// Physical schema derivation
pub mod schema;

/// Canonical string and typed value codec
pub mod codec;

/// Conversion audit record
pub mod audit;

/// Audited Parquet writer
pub mod writer;

/// Column and row readers
pub mod reader;

/// File compatibility checks
pub mod compat;

/// CSV row source and type-options metadata source
pub mod source;

/// Bulk conversions
pub mod convert;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use audit::{ConvertResult, ConvertStatus};
pub use codec::{DecimalValue, Value};
pub use compat::is_supported;
pub use config::{CompressionCodec, ConversionConfig, WriterConfig};
pub use convert::{
    canonical_file_to_parquet, canonical_to_parquet, parquet_to_canonical, read_metadata,
    ConversionSummary,
};
pub use error::{Error, ErrorCode, FieldEncodeError, Result};
pub use reader::{ColumnStreamReader, RowReader};
pub use schema::{ColumnKind, FieldDescriptor, FieldMetadata, PhysicalSchema};
pub use writer::{AuditedWriter, WriterState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
