//! Schema types

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precision used when a `number` type does not declare one, and the cap
pub const MAX_PRECISION: u8 = arrow::datatypes::DECIMAL128_MAX_PRECISION;

/// Scale used when a `number` type does not declare one
pub const DEFAULT_SCALE: u8 = 12;

/// Width in bytes of the fixed-length decimal representation
pub const DECIMAL_BYTE_WIDTH: i32 = 16;

// ============================================================================
// Declared Field Metadata
// ============================================================================

/// A `(field name, declared type)` pair as supplied by the metadata source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub field_name: String,
    pub field_type: String,
}

impl FieldMetadata {
    pub fn new(field_name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            field_type: field_type.into(),
        }
    }

    /// True for `varchar` declarations
    pub fn is_string_type(&self) -> bool {
        self.field_type.trim().to_ascii_lowercase().starts_with("varchar")
    }
}

// ============================================================================
// Column Kind
// ============================================================================

/// Storage kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Utf8,
    Double,
    Int32,
    Date,
    TimestampMillis,
    Decimal,
}

impl ColumnKind {
    /// Name of the storage annotation backing this kind
    pub fn storage_name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF8",
            Self::Double => "DOUBLE",
            Self::Int32 => "INT32",
            Self::Date => "DATE",
            Self::TimestampMillis => "TIMESTAMP_MILLIS",
            Self::Decimal => "DECIMAL",
        }
    }

    /// Declared type name a column of this kind maps back to
    pub fn declared_type(self) -> &'static str {
        match self {
            Self::Utf8 => "varchar",
            Self::Double => "double",
            Self::Int32 => "integer",
            Self::Date => "date",
            Self::TimestampMillis => "timestamp",
            Self::Decimal => "number",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_name())
    }
}

// ============================================================================
// Field Descriptor
// ============================================================================

fn is_false(value: &bool) -> bool {
    !*value
}

/// One column of a physical schema. Every column is nullable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Positional identifier (`f0`, `f1`, ...)
    pub id: String,

    /// Declared name, used in diagnostics only
    #[serde(default)]
    pub source_name: String,

    pub kind: ColumnKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub default_precision: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub default_scale: bool,

    /// Declared as `time`: stored as a timestamp on 1970-01-01
    #[serde(default, skip_serializing_if = "is_false")]
    pub time_of_day: bool,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            id: id.into(),
            source_name: String::new(),
            kind,
            precision: None,
            scale: None,
            default_precision: false,
            default_scale: false,
            time_of_day: false,
        }
    }

    /// A decimal column with explicit precision and scale
    pub fn decimal(id: impl Into<String>, precision: u8, scale: u8) -> Self {
        Self {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::new(id, ColumnKind::Decimal)
        }
    }

    /// A timestamp column carrying only a time of day
    pub fn time(id: impl Into<String>) -> Self {
        Self {
            time_of_day: true,
            ..Self::new(id, ColumnKind::TimestampMillis)
        }
    }

    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Decimal precision, falling back to the maximum
    pub fn decimal_precision(&self) -> u8 {
        self.precision.unwrap_or(MAX_PRECISION)
    }

    /// Decimal scale, falling back to the default
    pub fn decimal_scale(&self) -> u8 {
        self.scale.unwrap_or(DEFAULT_SCALE)
    }

    /// Declared type this column maps back to
    pub fn declared_type(&self) -> String {
        match self.kind {
            ColumnKind::TimestampMillis if self.time_of_day => "time".to_string(),
            ColumnKind::Decimal if !self.default_precision => {
                format!(
                    "number({},{})",
                    self.decimal_precision(),
                    self.decimal_scale()
                )
            }
            kind => kind.declared_type().to_string(),
        }
    }
}

// ============================================================================
// Physical Schema
// ============================================================================

/// Ordered, immutable list of column descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhysicalSchema {
    fields: Vec<FieldDescriptor>,
}

impl PhysicalSchema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the column with the given identifier
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Serialize for the `PHYSICAL_SCHEMA` metadata entry
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
