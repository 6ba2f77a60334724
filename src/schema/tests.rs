//! Tests for schema module

use super::*;
use parquet::basic::{ConvertedType, Type as PhysicalType};
use parquet::schema::types::SchemaDescriptor;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn fields(types: &[&str]) -> Vec<FieldMetadata> {
    types
        .iter()
        .enumerate()
        .map(|(i, t)| FieldMetadata::new(format!("col_{i}"), *t))
        .collect()
}

// ============================================================================
// Derivation Tests
// ============================================================================

#[test_case("varchar(20)", ColumnKind::Utf8; "varchar")]
#[test_case("geometry", ColumnKind::Utf8; "geometry")]
#[test_case("double", ColumnKind::Double; "double")]
#[test_case("date", ColumnKind::Date; "date")]
#[test_case("time", ColumnKind::TimestampMillis; "time")]
#[test_case("timestamp", ColumnKind::TimestampMillis; "timestamp")]
#[test_case("number(10,2)", ColumnKind::Decimal; "decimal")]
#[test_case("integer", ColumnKind::Int32; "integer")]
#[test_case("boolean", ColumnKind::Int32; "unknown falls back to int32")]
fn test_declared_type_kind(declared: &str, expected: ColumnKind) {
    let field = derive_field(0, &FieldMetadata::new("c", declared));
    assert_eq!(field.kind, expected);
}

#[test]
fn test_identifiers_are_positional() {
    let schema = derive_schema(&fields(&["varchar", "double", "date"]));
    let ids: Vec<&str> = schema.fields().iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["f0", "f1", "f2"]);
    assert_eq!(schema.fields()[1].source_name, "col_1");
    assert_eq!(schema.index_of("f2"), Some(2));
    assert_eq!(schema.index_of("col_2"), None);
}

#[test]
fn test_time_sets_time_of_day() {
    let schema = derive_schema(&fields(&["time", "timestamp"]));
    assert!(schema.fields()[0].time_of_day);
    assert!(!schema.fields()[1].time_of_day);
}

#[test]
fn test_is_string_type() {
    assert!(FieldMetadata::new("a", "varchar(10)").is_string_type());
    assert!(!FieldMetadata::new("a", "number").is_string_type());
}

// ============================================================================
// Decimal Declaration Tests
// ============================================================================

#[test_case("number", 38, 12, true, true; "bare number")]
#[test_case("number(10,2)", 10, 2, false, false; "precision and scale")]
#[test_case("number(10, 2)", 10, 2, false, false; "space after comma")]
#[test_case("number(20)", 20, 12, false, true; "precision only")]
#[test_case("number(10)", 10, 10, false, true; "default scale clamped")]
#[test_case("number(50,2)", 38, 12, false, false; "precision above max resets")]
#[test_case("number(5,9)", 5, 5, false, false; "scale clamped to precision")]
#[test_case("number(abc)", 38, 12, true, true; "malformed falls back")]
#[test_case("number(99999999999999999999999,1)", 38, 12, false, false; "oversized digits")]
fn test_parse_decimal_type(
    declared: &str,
    precision: u8,
    scale: u8,
    default_precision: bool,
    default_scale: bool,
) {
    let spec = parse_decimal_type(declared);
    assert_eq!(
        spec,
        DecimalSpec {
            precision,
            scale,
            default_precision,
            default_scale,
        }
    );
}

#[test]
fn test_decimal_descriptor_flags() {
    let field = derive_field(3, &FieldMetadata::new("amount", "number"));
    assert_eq!(field.precision, Some(38));
    assert_eq!(field.scale, Some(12));
    assert!(field.default_precision);
    assert!(field.default_scale);
    assert_eq!(field.declared_type(), "number");

    let field = derive_field(3, &FieldMetadata::new("amount", "number(12,4)"));
    assert_eq!(field.declared_type(), "number(12,4)");
}

// ============================================================================
// Parquet Mapping Tests
// ============================================================================

#[test]
fn test_message_type_columns() {
    let schema = derive_schema(&fields(&[
        "varchar", "double", "integer", "date", "timestamp", "number(10,2)",
    ]));
    let message = to_message_type(&schema).unwrap();
    let descr = SchemaDescriptor::new(message);

    assert_eq!(descr.num_columns(), 6);
    let expected = [
        (PhysicalType::BYTE_ARRAY, ConvertedType::UTF8),
        (PhysicalType::DOUBLE, ConvertedType::NONE),
        (PhysicalType::INT32, ConvertedType::NONE),
        (PhysicalType::INT32, ConvertedType::DATE),
        (PhysicalType::INT64, ConvertedType::TIMESTAMP_MILLIS),
        (PhysicalType::FIXED_LEN_BYTE_ARRAY, ConvertedType::DECIMAL),
    ];
    for (column, (physical, converted)) in descr.columns().iter().zip(expected) {
        assert_eq!(column.physical_type(), physical);
        assert_eq!(column.converted_type(), converted);
        assert_eq!(column.max_def_level(), 1, "column {} is nullable", column.name());
    }

    let decimal = descr.column(5);
    assert_eq!(decimal.type_precision(), 10);
    assert_eq!(decimal.type_scale(), 2);
    assert_eq!(decimal.type_length(), DECIMAL_BYTE_WIDTH);
}

#[test]
fn test_column_kind_round_trip() {
    let schema = derive_schema(&fields(&[
        "varchar", "double", "integer", "date", "time", "number(10,2)",
    ]));
    let descr = SchemaDescriptor::new(to_message_type(&schema).unwrap());

    for (column, field) in descr.columns().iter().zip(schema.fields()) {
        assert_eq!(column_kind(column), Some(field.kind));
        let recovered = descriptor_from_column(column).unwrap();
        assert_eq!(recovered.kind, field.kind);
        assert_eq!(recovered.precision, field.precision);
        assert_eq!(recovered.scale, field.scale);
    }

    let declared: Vec<&str> = descr
        .columns()
        .iter()
        .map(|c| declared_type_of(c).unwrap())
        .collect();
    assert_eq!(
        declared,
        vec!["varchar", "double", "integer", "date", "timestamp", "number"]
    );
}

#[test]
fn test_unsupported_column_kind() {
    use parquet::schema::parser::parse_message_type;
    use std::sync::Arc;

    let message = parse_message_type(
        "message m { optional boolean flag; optional int64 big; optional float ratio; }",
    )
    .unwrap();
    let descr = SchemaDescriptor::new(Arc::new(message));

    for column in descr.columns() {
        assert_eq!(column_kind(column), None);
        assert!(descriptor_from_column(column).is_none());
    }
    assert_eq!(storage_type_name(descr.column(0).as_ref()), "BOOLEAN");
    assert_eq!(storage_type_name(descr.column(1).as_ref()), "INT64");

    let err = declared_type_of(descr.column(2).as_ref()).unwrap_err();
    assert!(err.to_string().contains("FLOAT"));
}

#[test]
fn test_physical_schema_json() {
    let schema = derive_schema(&fields(&["time", "number", "varchar"]));
    let json = schema.to_json().unwrap();
    assert!(json.contains("\"time_of_day\":true"));
    assert!(json.contains("\"default_scale\":true"));

    let parsed = PhysicalSchema::from_json(&json).unwrap();
    assert_eq!(parsed, schema);
}
