//! Tests for source module

use super::*;
use crate::error::Error;
use crate::schema::FieldMetadata;
use pretty_assertions::assert_eq;
use std::io::Cursor;
use test_case::test_case;

fn read_all(input: &str) -> Vec<Vec<String>> {
    CsvRowReader::new(Cursor::new(input))
        .collect::<crate::error::Result<_>>()
        .unwrap()
}

// ============================================================================
// CSV Tests
// ============================================================================

#[test_case("a,b,c", &["a", "b", "c"] ; "plain")]
#[test_case(" a , b ", &[" a ", " b "] ; "no trimming")]
#[test_case("\"x,y\",z", &["x,y", "z"] ; "quoted delimiter")]
#[test_case("\"say \"\"hi\"\"\",1", &["say \"hi\"", "1"] ; "doubled quotes")]
#[test_case("a\\,b", &["a\\", "b"] ; "backslash is literal")]
#[test_case("a,,", &["a", "", ""] ; "trailing empty fields")]
#[test_case("", &[""] ; "empty line")]
fn test_csv_single_record(line: &str, expected: &[&str]) {
    let rows = read_all(&format!("{line}\n"));
    assert_eq!(rows, vec![expected.to_vec()]);
}

#[test]
fn test_csv_embedded_newline() {
    let rows = read_all("1,\"first\nsecond\",x\r\n2,plain,y\n");
    assert_eq!(
        rows,
        vec![vec!["1", "first\nsecond", "x"], vec!["2", "plain", "y"]]
    );
}

#[test]
fn test_csv_without_final_newline() {
    assert_eq!(read_all("a,b\nc,d"), vec![vec!["a", "b"], vec!["c", "d"]]);
}

#[test]
fn test_csv_custom_delimiter() {
    let mut reader = CsvRowReader::with_delimiter(Cursor::new("a|b,c\n"), '|');
    assert_eq!(reader.read_row().unwrap(), Some(vec!["a".into(), "b,c".into()]));
    assert_eq!(reader.read_row().unwrap(), None);
    assert_eq!(reader.line(), 1);
}

#[test]
fn test_csv_unterminated_quote() {
    let mut reader = CsvRowReader::new(Cursor::new("ok,1\n\"open,2\nmore"));
    assert!(reader.read_row().unwrap().is_some());
    let err = reader.read_row().unwrap_err();
    assert!(matches!(err, Error::CsvParse { line: 2, .. }));
}

// ============================================================================
// XML Tests
// ============================================================================

#[test]
fn test_parse_xml_structure() {
    let doc = parse_xml(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <!-- header -->
        <root a="1" b='two &amp; three'>
            <item>x &lt; y</item>
            <empty/>
            <item><![CDATA[<raw>]]></item>
            <nested><item>&#65;&#x42;</item></nested>
        </root>"#,
    )
    .unwrap();

    assert_eq!(doc.name, "root");
    assert_eq!(doc.attribute("a"), Some("1"));
    assert_eq!(doc.attribute("b"), Some("two & three"));
    assert_eq!(doc.child("item").unwrap().text_content(), "x < y");
    assert!(doc.child("empty").unwrap().children.is_empty());

    let items: Vec<String> = doc
        .descendants("item")
        .into_iter()
        .map(|e| e.text_content())
        .collect();
    assert_eq!(items, vec!["x < y", "<raw>", "AB"]);
    assert_eq!(doc.first_descendant("nested").unwrap().children.len(), 1);
}

#[test_case("not xml" ; "no markup")]
#[test_case("<a><b></a>" ; "mismatched close")]
#[test_case("<a>" ; "unclosed")]
#[test_case("<a x=1/>" ; "unquoted attribute")]
#[test_case("<a>&bogus;</a>" ; "unknown entity")]
#[test_case("<a/><b/>" ; "two roots")]
fn test_parse_xml_rejects(input: &str) {
    let err = parse_xml(input).unwrap_err();
    assert!(matches!(err, Error::InvalidTypeOptions { .. }));
}

// ============================================================================
// Type Options Tests
// ============================================================================

const TYPE_OPTIONS: &str = r#"<?xml version="1.0"?>
<ds:dataset xmlns:ds="urn:dataset">
  <ds:tables>
    <ds:table name="orders">
      <ds:columns>
        <ds:column><ds:name>id</ds:name><ds:datatype>integer</ds:datatype></ds:column>
        <ds:column><ds:name>amount</ds:name><ds:datatype>number(10,2)</ds:datatype></ds:column>
        <ds:column><ds:name>note</ds:name><ds:datatype>varchar(200)</ds:datatype></ds:column>
      </ds:columns>
    </ds:table>
    <ds:table name="customers">
      <ds:columns>
        <ds:column><ds:name>name</ds:name><ds:datatype>varchar</ds:datatype></ds:column>
      </ds:columns>
    </ds:table>
  </ds:tables>
  <ds:prepareTables>
    <ds:prepareTable>
      <ds:columns>
        <ds:column><ds:name>amount</ds:name></ds:column>
        <ds:column transform="bis"><ds:name>derived</ds:name><ds:datatype>double</ds:datatype></ds:column>
        <ds:column><ds:name>id</ds:name><ds:datatype>double</ds:datatype></ds:column>
      </ds:columns>
    </ds:prepareTable>
  </ds:prepareTables>
</ds:dataset>"#;

#[test]
fn test_input_fields() {
    let doc = parse_xml(TYPE_OPTIONS).unwrap();
    assert_eq!(
        input_fields(&doc, None).unwrap(),
        vec![
            FieldMetadata::new("id", "integer"),
            FieldMetadata::new("amount", "number(10,2)"),
            FieldMetadata::new("note", "varchar(200)"),
        ]
    );
    assert_eq!(
        input_fields(&doc, Some("customers")).unwrap(),
        vec![FieldMetadata::new("name", "varchar")]
    );
    assert_eq!(input_fields(&doc, Some("unknown")).unwrap().len(), 3);
    assert_eq!(input_table_name(&doc).unwrap().as_deref(), Some("orders"));
}

#[test]
fn test_published_fields() {
    let doc = parse_xml(TYPE_OPTIONS).unwrap();
    assert_eq!(
        published_fields(&doc).unwrap(),
        vec![
            FieldMetadata::new("amount", "number(10,2)"),
            FieldMetadata::new("id", "double"),
        ]
    );
}

#[test]
fn test_published_fields_fall_back_to_input() {
    let doc = parse_xml(
        r#"<ds:dataset>
             <ds:tables><ds:table name="t"><ds:column><ds:name>a</ds:name><ds:datatype>date</ds:datatype></ds:column></ds:table></ds:tables>
             <ds:prepareTables><ds:prepareTable><ds:columns/></ds:prepareTable></ds:prepareTables>
           </ds:dataset>"#,
    )
    .unwrap();
    assert_eq!(
        published_fields(&doc).unwrap(),
        vec![FieldMetadata::new("a", "date")]
    );
}

#[test]
fn test_missing_tables_is_invalid() {
    let doc = parse_xml("<ds:dataset/>").unwrap();
    let err = published_fields(&doc).unwrap_err();
    assert!(matches!(err, Error::InvalidTypeOptions { .. }));
}

#[test]
fn test_load_type_options_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("types.xml");
    std::fs::write(&path, TYPE_OPTIONS).unwrap();

    let doc = load_type_options(&path).unwrap();
    assert_eq!(published_fields(&doc).unwrap().len(), 2);

    let err = load_type_options(dir.path().join("absent.xml")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}
