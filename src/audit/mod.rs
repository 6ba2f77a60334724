//! Conversion audit module
//!
//! Tracks per-row conversion failures while a file is written and produces
//! the record persisted in the file's key/value metadata.

mod types;

pub use types::{AuditLog, AuditSnapshot, ConvertResult, ConvertStatus, ErrorLog};

/// Metadata key holding the [`ConvertStatus`]
pub const CONVERT_RESULT_KEY: &str = "CONVERT_RESULT";

/// Metadata key holding the JSON [`ConvertResult`]
pub const DETAIL_MESSAGE_KEY: &str = "DETAIL_MESSAGE";

/// Metadata key holding the file format version
pub const FORMAT_VERSION_KEY: &str = "FORMAT_VERSION";

pub const FORMAT_VERSION: &str = "1.0";

/// Metadata key holding the JSON physical schema
pub const PHYSICAL_SCHEMA_KEY: &str = "PHYSICAL_SCHEMA";

#[cfg(test)]
mod tests;
