//! Configuration types for conversion jobs
//!
//! [`WriterConfig`] controls how the audited writer lays out a Parquet file.
//! [`ConversionConfig`] wraps it together with the row-source and export
//! options, and can be loaded from a YAML or JSON file.

use crate::error::{Error, Result};
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Compression
// ============================================================================

/// Compression codec applied to every column chunk
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    Uncompressed,
    #[default]
    Snappy,
    Gzip,
    Zstd,
}

impl CompressionCodec {
    fn to_parquet(self) -> Compression {
        match self {
            Self::Uncompressed => Compression::UNCOMPRESSED,
            Self::Snappy => Compression::SNAPPY,
            Self::Gzip => Compression::GZIP(GzipLevel::default()),
            Self::Zstd => Compression::ZSTD(ZstdLevel::default()),
        }
    }
}

// ============================================================================
// Writer Config
// ============================================================================

/// Configuration for the audited Parquet writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    compression: CompressionCodec,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
    audit_enabled: bool,
    key_value_metadata: BTreeMap<String, String>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::Snappy,
            row_group_size: 1024 * 1024,
            dictionary_enabled: true,
            statistics_enabled: true,
            audit_enabled: true,
            key_value_metadata: BTreeMap::new(),
        }
    }
}

impl WriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionCodec) -> Self {
        self.compression = compression;
        self
    }

    /// Set the number of rows buffered before a row group is flushed
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Enable or disable the persisted audit record
    #[must_use]
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Add one caller supplied key/value metadata entry
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_value_metadata.insert(key.into(), value.into());
        self
    }

    /// Replace the caller supplied key/value metadata
    #[must_use]
    pub fn with_key_value_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.key_value_metadata = metadata;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(self) -> Self {
        self.with_compression(CompressionCodec::Uncompressed)
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(self) -> Self {
        self.with_compression(CompressionCodec::Zstd)
    }

    /// Use GZIP compression
    #[must_use]
    pub fn gzip(self) -> Self {
        self.with_compression(CompressionCodec::Gzip)
    }

    /// Get compression codec
    pub fn compression(&self) -> CompressionCodec {
        self.compression
    }

    /// Get row group size
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Get dictionary encoding enabled
    pub fn is_dictionary_enabled(&self) -> bool {
        self.dictionary_enabled
    }

    /// Get statistics enabled
    pub fn is_statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    /// Get audit enabled
    pub fn is_audit_enabled(&self) -> bool {
        self.audit_enabled
    }

    /// Caller supplied key/value metadata
    pub fn key_value_metadata(&self) -> &BTreeMap<String, String> {
        &self.key_value_metadata
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.row_group_size == 0 {
            return Err(Error::config("row_group_size must be greater than zero"));
        }
        Ok(())
    }

    /// Build writer properties
    pub(crate) fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression.to_parquet())
            .set_max_row_group_size(self.row_group_size.max(1))
            .set_created_by(format!("{} version {}", crate::NAME, crate::VERSION));

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder = builder.set_statistics_enabled(EnabledStatistics::None);
        }

        builder.build()
    }
}

// ============================================================================
// Conversion Config
// ============================================================================

/// Options for a whole conversion job, loadable from YAML or JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Writer settings
    pub writer: WriterConfig,

    /// First canonical row is a header and is skipped
    pub has_header: bool,

    /// Field separator of the canonical rows
    pub delimiter: char,

    /// Input table to take field metadata from (first table when unset)
    pub table: Option<String>,

    /// Export limit on rows
    pub max_rows: Option<u64>,

    /// Export limit on leading columns
    pub max_columns: Option<usize>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            writer: WriterConfig::default(),
            has_header: false,
            delimiter: ',',
            table: None,
            max_rows: None,
            max_columns: None,
        }
    }
}

impl ConversionConfig {
    /// Load a config file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        self.writer.validate()?;
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(Error::config(format!(
                "delimiter {:?} cannot be used as a field separator",
                self.delimiter
            )));
        }
        Ok(())
    }
}
