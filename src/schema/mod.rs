//! Physical schema module
//!
//! Turns declared field types into a typed, nullable Parquet schema and back.
//!
//! # Overview
//!
//! - `derive_schema` - declared `(name, type)` pairs to a [`PhysicalSchema`]
//! - `to_message_type` - physical schema to a Parquet message type
//! - `resolve_schema` - recover the physical schema of an existing file
//!
//! Column identifiers are positional (`f0`, `f1`, ...). The declared names are
//! kept on each descriptor for diagnostics only.

mod deriver;
mod storage;
mod types;

pub use deriver::{derive_field, derive_schema, parse_decimal_type, DecimalSpec};
pub use storage::{
    column_kind, declared_type_of, descriptor_from_column, key_value_map, parquet_field,
    persisted_schema, resolve_schema, storage_type_name, to_message_type, ROOT_NAME,
};
pub use types::{
    ColumnKind, FieldDescriptor, FieldMetadata, PhysicalSchema, DECIMAL_BYTE_WIDTH,
    DEFAULT_SCALE, MAX_PRECISION,
};

#[cfg(test)]
mod tests;
