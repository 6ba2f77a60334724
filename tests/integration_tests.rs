//! Integration tests for full conversion flows
//!
//! Tests the end-to-end flow: type options + canonical CSV → Parquet → canonical CSV

use canonparq::audit::{CONVERT_RESULT_KEY, DETAIL_MESSAGE_KEY, FORMAT_VERSION_KEY};
use canonparq::schema::derive_schema;
use canonparq::source::{parse_xml, published_fields};
use canonparq::{
    canonical_to_parquet, is_supported, parquet_to_canonical, read_metadata, AuditedWriter,
    ColumnKind, ColumnStreamReader, ConversionConfig, ConvertResult, ConvertStatus, Error,
    ErrorCode, FieldMetadata, RowReader, Value, WriterConfig,
};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::path::Path;
use tempfile::tempdir;
use test_case::test_case;

fn field(name: &str, declared: &str) -> FieldMetadata {
    FieldMetadata::new(name, declared)
}

fn export(path: &Path) -> String {
    let mut out = Vec::new();
    parquet_to_canonical(path, &mut out, None, None).unwrap();
    String::from_utf8(out).unwrap()
}

// ============================================================================
// Schema Derivation
// ============================================================================

#[test_case("number(40,2)", 38, 12 ; "precision above maximum")]
#[test_case("number(50)", 38, 12 ; "precision only above maximum")]
#[test_case("number(5,9)", 5, 5 ; "scale above precision")]
#[test_case("number", 38, 12 ; "bare number")]
#[test_case("number(12,4)", 12, 4 ; "explicit")]
fn test_decimal_derivation(declared: &str, precision: u8, scale: u8) {
    let schema = derive_schema(&[field("amount", declared)]);
    let descriptor = &schema.fields()[0];
    assert_eq!(descriptor.kind, ColumnKind::Decimal);
    assert_eq!(descriptor.decimal_precision(), precision);
    assert_eq!(descriptor.decimal_scale(), scale);
}

// ============================================================================
// Round Trips
// ============================================================================

#[test_case("date", "2020-03-04", "2020-03-04" ; "date")]
#[test_case("timestamp", "2000-01-04T00:00:00.000Z", "2000-01-04 00:00:00.0" ; "published timestamp")]
#[test_case("time", "1975-01-01T04:23:55.345Z", "04:23:55.345" ; "time from timestamp")]
#[test_case("number(10,2)", "-12.3456", "-12.34" ; "decimal truncated toward zero")]
#[test_case("number(20,3)", "1.5E3", "1500.000" ; "decimal without exponent")]
#[test_case("double", "1,234.5", "1234.5" ; "double grouping")]
#[test_case("varchar", "x,\"y\"", "\"x,\"\"y\"\"\"" ; "string needing quotes")]
fn test_value_round_trip(declared: &str, input: &str, expected: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("round.parquet");

    let mut writer =
        AuditedWriter::create(&[field("v", declared), field("k", "integer")], &path, WriterConfig::new())
            .unwrap();
    writer.write(&[input, "1"]).unwrap();
    let result = writer.close().unwrap().unwrap();
    assert_eq!(result.failure_count, 0);

    let mut reader = RowReader::open(&path).unwrap();
    let rows = reader.next(10).unwrap();
    assert_eq!(rows, vec![vec![expected.to_string(), "1".to_string()]]);
}

#[test_case("varchar" ; "string")]
#[test_case("integer" ; "integer")]
#[test_case("double" ; "double")]
#[test_case("number(9,2)" ; "decimal")]
#[test_case("date" ; "date")]
#[test_case("timestamp" ; "timestamp")]
#[test_case("time" ; "time")]
fn test_empty_input_is_null(declared: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.parquet");

    let mut writer =
        AuditedWriter::create(&[field("v", declared), field("k", "integer")], &path, WriterConfig::new())
            .unwrap();
    writer.write(&["", "1"]).unwrap();
    writer.close().unwrap();

    let mut column = ColumnStreamReader::open(&path, "f0").unwrap();
    assert_eq!(column.next_value().unwrap(), Value::Null);
}

// ============================================================================
// Audit
// ============================================================================

#[test]
fn test_one_bad_field_among_many() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.parquet");
    let fields = vec![
        field("id", "integer"),
        field("day", "date"),
        field("note", "varchar"),
    ];

    let mut writer = AuditedWriter::create(&fields, &path, WriterConfig::new()).unwrap();
    writer.write(&["1", "2020-01-01", "ok"]).unwrap();
    writer.write(&["2", "not-a-date", "kept"]).unwrap();
    let before = writer.error_statistics();
    assert_eq!(before.failure_count, 1);
    assert_eq!(before.failure_percentage, 50.0);

    let result = writer.close().unwrap().unwrap();
    assert_eq!(result.status(), ConvertStatus::PartialSuccess);
    assert_eq!(result.success_count, 1);
    assert_eq!(result.failure_count, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.row_errors(1).unwrap().len(), 1);
    assert!(result.row_errors(1).unwrap().contains_key("f1"));

    assert_eq!(export(&path), "1,2020-01-01,ok\n2,,kept\n");

    let metadata = read_metadata(&path).unwrap();
    assert_eq!(metadata[CONVERT_RESULT_KEY], "PARTIAL_SUCCESS");
    assert_eq!(metadata[FORMAT_VERSION_KEY], "1.0");
    assert_eq!(
        ConvertResult::from_json(&metadata[DETAIL_MESSAGE_KEY]).unwrap(),
        result
    );
}

#[test_case(&["1", "2"], ConvertStatus::Success ; "no failures")]
#[test_case(&["1", "x"], ConvertStatus::PartialSuccess ; "some failures")]
#[test_case(&["x", "y"], ConvertStatus::Failed ; "all failures")]
fn test_status_classification(values: &[&str], expected: ConvertStatus) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("status.parquet");
    let mut writer =
        AuditedWriter::create(&[field("n", "integer")], &path, WriterConfig::new()).unwrap();
    for value in values {
        writer.write(&[*value]).unwrap();
    }
    assert_eq!(writer.close().unwrap().unwrap().status(), expected);
}

#[test]
fn test_row_shape_mismatch_persists_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shape.parquet");
    let mut writer = AuditedWriter::create(
        &[field("a", "integer"), field("b", "integer")],
        &path,
        WriterConfig::new(),
    )
    .unwrap();

    for row in [vec!["1"], vec!["1", "2", "3"]] {
        let err = writer.write(&row).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DataLengthError);
    }
    writer.write(&["5", "6"]).unwrap();
    let result = writer.close().unwrap().unwrap();
    assert_eq!(result.total_count, 1);
    assert_eq!(export(&path), "5,6\n");
}

// ============================================================================
// Column Reading
// ============================================================================

#[test]
fn test_reading_past_the_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("end.parquet");
    let mut writer =
        AuditedWriter::create(&[field("n", "integer")], &path, WriterConfig::new()).unwrap();
    writer.write_rows(&[["1"], ["2"]]).unwrap();
    writer.close().unwrap();

    // Without polling has_next
    let mut reader = ColumnStreamReader::open(&path, "f0").unwrap();
    assert_eq!(reader.next_value().unwrap(), Value::Int32(1));
    assert_eq!(reader.next_value().unwrap(), Value::Int32(2));
    assert!(reader.next_value().unwrap_err().is_end_of_stream());
    assert!(reader.next_value().unwrap_err().is_end_of_stream());

    // With polling
    let mut reader = ColumnStreamReader::open(&path, "f0").unwrap();
    while reader.has_next() {
        reader.next_value().unwrap();
    }
    assert!(!reader.has_next());
    assert!(reader.next_value().unwrap_err().is_end_of_stream());
}

#[test]
fn test_missing_column_fails_at_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cols.parquet");
    AuditedWriter::create(&[field("n", "integer")], &path, WriterConfig::new())
        .unwrap()
        .close()
        .unwrap();

    let err = ColumnStreamReader::open(&path, "nope").err().unwrap();
    assert!(matches!(err, Error::ColumnNotFound { .. }));
}

// ============================================================================
// Bulk Conversion
// ============================================================================

const TYPE_OPTIONS: &str = r#"<ds:dataset>
  <ds:tables>
    <ds:table name="sales">
      <ds:column><ds:name>id</ds:name><ds:datatype>integer</ds:datatype></ds:column>
      <ds:column><ds:name>amount</ds:name><ds:datatype>number(12,2)</ds:datatype></ds:column>
      <ds:column><ds:name>sold</ds:name><ds:datatype>timestamp</ds:datatype></ds:column>
      <ds:column><ds:name>memo</ds:name><ds:datatype>varchar(100)</ds:datatype></ds:column>
    </ds:table>
  </ds:tables>
</ds:dataset>"#;

#[test]
fn test_csv_to_parquet_and_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sales.parquet");
    let fields = published_fields(&parse_xml(TYPE_OPTIONS).unwrap()).unwrap();
    assert_eq!(fields.len(), 4);

    let csv = "id,amount,sold,memo\n\
               1,10.999,2021-06-01 12:30:00,\"multi\nline\"\n\
               2,bad,2021-06-02 08:00:00.250,plain\n\
               \n\
               3,,,\n";
    let config = ConversionConfig {
        has_header: true,
        writer: WriterConfig::new().with_metadata("source", "sales.csv"),
        ..ConversionConfig::default()
    };

    let summary = canonical_to_parquet(Cursor::new(csv), &fields, &path, &config).unwrap();
    assert_eq!(summary.rows_written, 3);
    let result = summary.result.unwrap();
    assert_eq!(result.failure_count, 1);
    assert!(result.row_errors(1).unwrap().contains_key("f1"));

    assert_eq!(
        export(&path),
        "1,10.99,2021-06-01 12:30:00.0,\"multi\nline\"\n\
         2,,2021-06-02 08:00:00.250,plain\n\
         3,,,\n"
    );

    let metadata = read_metadata(&path).unwrap();
    assert_eq!(metadata["source"], "sales.csv");
    assert!(is_supported(&path).unwrap());
}
