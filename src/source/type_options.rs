//! Declared field types from a type-options document

use super::xml::{parse_xml, XmlElement};
use crate::error::{Error, Result, ResultExt};
use crate::schema::FieldMetadata;
use std::path::Path;
use tracing::debug;

const TABLES: &str = "ds:tables";
const TABLE: &str = "ds:table";
const COLUMN: &str = "ds:column";
const COLUMNS: &str = "ds:columns";
const NAME: &str = "ds:name";
const DATATYPE: &str = "ds:datatype";
const PREPARE_TABLES: &str = "ds:prepareTables";

/// Published columns produced by this transform are not part of the data
const SKIPPED_TRANSFORM: &str = "bis";

/// Read and parse a type-options file
pub fn load_type_options(path: impl AsRef<Path>) -> Result<XmlElement> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read type options {}", path.display()))?;
    parse_xml(&content)
}

/// Name attribute of the first input table
pub fn input_table_name(doc: &XmlElement) -> Result<Option<String>> {
    let table = doc
        .first_descendant(TABLES)
        .and_then(|tables| tables.first_descendant(TABLE))
        .ok_or_else(|| Error::type_options("document has no input table"))?;
    Ok(table.attribute("name").map(str::to_string))
}

/// Columns of the input table named `table`, or of the first input table
/// when `table` is `None` or matches nothing
pub fn input_fields(doc: &XmlElement, table: Option<&str>) -> Result<Vec<FieldMetadata>> {
    let tables = doc
        .first_descendant(TABLES)
        .ok_or_else(|| Error::type_options(format!("document has no {TABLES} element")))?;
    let candidates = tables.descendants(TABLE);

    let input = table
        .and_then(|name| {
            candidates
                .iter()
                .copied()
                .find(|t| t.attribute("name") == Some(name))
        })
        .or_else(|| candidates.first().copied())
        .ok_or_else(|| Error::type_options(format!("{TABLES} has no {TABLE} element")))?;

    let fields = input
        .descendants(COLUMN)
        .into_iter()
        .map(|column| -> Result<FieldMetadata> {
            let name = column_name(column);
            let declared = column.first_descendant(DATATYPE).ok_or_else(|| {
                Error::type_options(format!("input column {name} has no {DATATYPE}"))
            })?;
            Ok(FieldMetadata::new(name, declared.text_content()))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        table = input.attribute("name").unwrap_or_default(),
        fields = fields.len(),
        "Read input fields"
    );
    Ok(fields)
}

/// Columns of the published (prepared) table.
///
/// Columns added by the `bis` transform are skipped. A column without a
/// datatype takes the type of the input column with the same name. Documents
/// without published columns yield the input fields.
pub fn published_fields(doc: &XmlElement) -> Result<Vec<FieldMetadata>> {
    let inputs = input_fields(doc, None)?;

    let Some(columns) = doc
        .first_descendant(PREPARE_TABLES)
        .and_then(|prepared| prepared.first_descendant(COLUMNS))
    else {
        return Ok(inputs);
    };

    let mut fields = Vec::new();
    for column in columns.descendants(COLUMN) {
        if column.attribute("transform") == Some(SKIPPED_TRANSFORM) {
            continue;
        }
        let name = column_name(column);
        let declared = match column.first_descendant(DATATYPE) {
            Some(datatype) => datatype.text_content(),
            None => inputs
                .iter()
                .find(|f| f.field_name == name)
                .map(|f| f.field_type.clone())
                .ok_or_else(|| {
                    Error::type_options(format!("published column {name} has no {DATATYPE}"))
                })?,
        };
        fields.push(FieldMetadata::new(name, declared));
    }

    if fields.is_empty() {
        debug!("No published columns, using input fields");
        return Ok(inputs);
    }
    Ok(fields)
}

fn column_name(column: &XmlElement) -> String {
    column
        .child(NAME)
        .map(XmlElement::text_content)
        .unwrap_or_default()
}
