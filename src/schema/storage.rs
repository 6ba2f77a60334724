//! Mapping between physical schemas and Parquet file schemas

use super::types::{
    ColumnKind, FieldDescriptor, PhysicalSchema, DECIMAL_BYTE_WIDTH, DEFAULT_SCALE, MAX_PRECISION,
};
use crate::audit::PHYSICAL_SCHEMA_KEY;
use crate::error::{Error, Result};
use parquet::basic::{ConvertedType, Repetition, Type as PhysicalType};
use parquet::file::metadata::FileMetaData;
use parquet::schema::types::{ColumnDescriptor, SchemaDescriptor, Type, TypePtr};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Name of the root group of every written file
pub const ROOT_NAME: &str = "canonical_record";

// ============================================================================
// Physical schema -> Parquet
// ============================================================================

/// Parquet primitive type for one column
pub fn parquet_field(field: &FieldDescriptor) -> Result<Type> {
    let builder = match field.kind {
        ColumnKind::Utf8 => Type::primitive_type_builder(&field.id, PhysicalType::BYTE_ARRAY)
            .with_converted_type(ConvertedType::UTF8),
        ColumnKind::Double => Type::primitive_type_builder(&field.id, PhysicalType::DOUBLE),
        ColumnKind::Int32 => Type::primitive_type_builder(&field.id, PhysicalType::INT32),
        ColumnKind::Date => Type::primitive_type_builder(&field.id, PhysicalType::INT32)
            .with_converted_type(ConvertedType::DATE),
        ColumnKind::TimestampMillis => {
            Type::primitive_type_builder(&field.id, PhysicalType::INT64)
                .with_converted_type(ConvertedType::TIMESTAMP_MILLIS)
        }
        ColumnKind::Decimal => {
            Type::primitive_type_builder(&field.id, PhysicalType::FIXED_LEN_BYTE_ARRAY)
                .with_converted_type(ConvertedType::DECIMAL)
                .with_length(DECIMAL_BYTE_WIDTH)
                .with_precision(i32::from(field.decimal_precision()))
                .with_scale(i32::from(field.decimal_scale()))
        }
    };

    Ok(builder.with_repetition(Repetition::OPTIONAL).build()?)
}

/// Parquet message type for a whole schema
pub fn to_message_type(schema: &PhysicalSchema) -> Result<TypePtr> {
    let fields = schema
        .fields()
        .iter()
        .map(|field| parquet_field(field).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;

    let root = Type::group_type_builder(ROOT_NAME)
        .with_fields(fields)
        .build()?;
    Ok(Arc::new(root))
}

// ============================================================================
// Parquet -> Physical schema
// ============================================================================

/// Storage kind of a leaf column, `None` when it is not one this crate reads
pub fn column_kind(column: &ColumnDescriptor) -> Option<ColumnKind> {
    match (column.physical_type(), column.converted_type()) {
        (PhysicalType::INT32, ConvertedType::NONE | ConvertedType::INT_32) => {
            Some(ColumnKind::Int32)
        }
        (PhysicalType::INT32, ConvertedType::DATE) => Some(ColumnKind::Date),
        (PhysicalType::DOUBLE, ConvertedType::NONE) => Some(ColumnKind::Double),
        (PhysicalType::BYTE_ARRAY, ConvertedType::UTF8) => Some(ColumnKind::Utf8),
        (PhysicalType::INT64, ConvertedType::TIMESTAMP_MILLIS) => {
            Some(ColumnKind::TimestampMillis)
        }
        (PhysicalType::FIXED_LEN_BYTE_ARRAY | PhysicalType::BYTE_ARRAY, ConvertedType::DECIMAL) => {
            Some(ColumnKind::Decimal)
        }
        _ => None,
    }
}

/// Annotation name of a column: the converted type if any, else the physical type
pub fn storage_type_name(column: &ColumnDescriptor) -> String {
    match column.converted_type() {
        ConvertedType::NONE => column.physical_type().to_string(),
        converted => converted.to_string(),
    }
}

/// Declared type name a file column maps back to
pub fn declared_type_of(column: &ColumnDescriptor) -> Result<&'static str> {
    column_kind(column)
        .map(ColumnKind::declared_type)
        .ok_or_else(|| Error::unsupported_type(column.name(), storage_type_name(column)))
}

/// Descriptor for a file column without any persisted flags
pub fn descriptor_from_column(column: &ColumnDescriptor) -> Option<FieldDescriptor> {
    let kind = column_kind(column)?;
    let descriptor = match kind {
        ColumnKind::Decimal => {
            let precision = u8::try_from(column.type_precision()).unwrap_or(MAX_PRECISION);
            let scale = u8::try_from(column.type_scale()).unwrap_or(DEFAULT_SCALE);
            FieldDescriptor::decimal(column.name(), precision.min(MAX_PRECISION), scale)
        }
        kind => FieldDescriptor::new(column.name(), kind),
    };
    Some(descriptor.with_source_name(column.name()))
}

/// Key/value metadata of a file as an ordered map; entries without a value are skipped
pub fn key_value_map(metadata: &FileMetaData) -> BTreeMap<String, String> {
    metadata
        .key_value_metadata()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|kv| kv.value.clone().map(|value| (kv.key.clone(), value)))
                .collect()
        })
        .unwrap_or_default()
}

/// Schema persisted by the writer, if present and consistent with the file columns
pub fn persisted_schema(metadata: &FileMetaData) -> Option<PhysicalSchema> {
    let json = metadata
        .key_value_metadata()?
        .iter()
        .find(|kv| kv.key == PHYSICAL_SCHEMA_KEY)?
        .value
        .as_deref()?;

    let schema = match PhysicalSchema::from_json(json) {
        Ok(schema) => schema,
        Err(e) => {
            debug!(error = %e, "ignoring unreadable persisted schema");
            return None;
        }
    };

    if matches_columns(&schema, metadata.schema_descr()) {
        Some(schema)
    } else {
        debug!("persisted schema does not match file columns, ignoring it");
        None
    }
}

fn matches_columns(schema: &PhysicalSchema, descr: &SchemaDescriptor) -> bool {
    schema.len() == descr.num_columns()
        && schema
            .fields()
            .iter()
            .zip(descr.columns())
            .all(|(field, column)| {
                field.id == column.name() && column_kind(column) == Some(field.kind)
            })
}

/// Physical schema of a file: the persisted one when usable, else recovered from the columns
pub fn resolve_schema(metadata: &FileMetaData) -> Result<PhysicalSchema> {
    if let Some(schema) = persisted_schema(metadata) {
        return Ok(schema);
    }

    let fields = metadata
        .schema_descr()
        .columns()
        .iter()
        .map(|column| {
            descriptor_from_column(column)
                .ok_or_else(|| Error::unsupported_type(column.name(), storage_type_name(column)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PhysicalSchema::new(fields))
}
