//! Error types for canonparq
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Per-field conversion failures are a separate, recoverable class
//! ([`FieldEncodeError`]): the writer records them in the audit log and
//! keeps going, so they never surface through [`Error`] during a write.

use thiserror::Error;

/// The main error type for canonparq
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid type options: {message}")]
    InvalidTypeOptions { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Conversion Errors
    // ============================================================================
    #[error("Data columns do not match the field metadata columns: expected {expected}, got {actual}")]
    RowShapeMismatch { expected: usize, actual: usize },

    #[error("Writer is already closed")]
    WriterClosed,

    #[error("CSV parsing error at line {line}: {message}")]
    CsvParse { line: usize, message: String },

    // ============================================================================
    // Reader Errors
    // ============================================================================
    #[error("Column {column} is not found in parquet file {path}")]
    ColumnNotFound { column: String, path: String },

    #[error("Unsupported data type {kind} is found in column {column}")]
    UnsupportedColumnType { column: String, kind: String },

    #[error("End of file reached for parquet file {path}")]
    EndOfStream { path: String },

    #[error("Unable to fetch metadata from parquet file {path}: {message}")]
    MetadataFetch { path: String, message: String },

    // ============================================================================
    // Parquet Errors
    // ============================================================================
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse error classification, stable across releases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Field metadata could not be read or is inconsistent
    InvalidTypeOptions,
    /// Underlying transport or storage fault
    IoException,
    /// Caller supplied something unusable (unknown column, closed writer)
    IllegalArgument,
    /// Anything else
    Unknown,
    /// File level key/value metadata could not be read
    MetadataFetchError,
    /// Row length does not match the schema
    DataLengthError,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a type options error
    pub fn type_options(message: impl Into<String>) -> Self {
        Self::InvalidTypeOptions {
            message: message.into(),
        }
    }

    /// Create a row shape error
    pub fn row_shape(expected: usize, actual: usize) -> Self {
        Self::RowShapeMismatch { expected, actual }
    }

    /// Create a column not found error
    pub fn column_not_found(column: impl Into<String>, path: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            path: path.into(),
        }
    }

    /// Create an unsupported column type error
    pub fn unsupported_type(column: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedColumnType {
            column: column.into(),
            kind: kind.into(),
        }
    }

    /// Create an end of stream error
    pub fn end_of_stream(path: impl Into<String>) -> Self {
        Self::EndOfStream { path: path.into() }
    }

    /// Create a metadata fetch error
    pub fn metadata_fetch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MetadataFetch {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a CSV parse error
    pub fn csv(line: usize, message: impl Into<String>) -> Self {
        Self::CsvParse {
            line,
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidTypeOptions { .. } => ErrorCode::InvalidTypeOptions,
            Error::RowShapeMismatch { .. } => ErrorCode::DataLengthError,
            Error::MetadataFetch { .. } => ErrorCode::MetadataFetchError,
            Error::Io(_)
            | Error::Parquet(_)
            | Error::FileNotFound { .. }
            | Error::CsvParse { .. }
            | Error::EndOfStream { .. } => ErrorCode::IoException,
            Error::Config { .. }
            | Error::ColumnNotFound { .. }
            | Error::UnsupportedColumnType { .. }
            | Error::WriterClosed => ErrorCode::IllegalArgument,
            _ => ErrorCode::Unknown,
        }
    }

    /// True for the expected terminal signal of a column stream
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream { .. })
    }
}

/// Result type alias for canonparq
pub type Result<T> = std::result::Result<T, Error>;

/// Per-field conversion failure, recorded in the audit log instead of aborting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldEncodeError {
    #[error("Input data {value} is not a valid {expected} data")]
    InvalidNumericLiteral { value: String, expected: &'static str },

    #[error("Input data {value} is not a valid decimal: {reason}")]
    InvalidDecimalLiteral { value: String, reason: String },

    #[error("Input data {value} is not in date format")]
    InvalidDateLiteral { value: String },

    #[error("Input data {value} is not in timestamp format")]
    InvalidTimestampLiteral { value: String },
}

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
