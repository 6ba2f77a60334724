//! Batch reader over whole rows

use crate::codec::{date_from_epoch_days, decode_row, timestamp_from_millis, DecimalValue, Value};
use crate::error::{Error, Result};
use crate::schema::{key_value_map, resolve_schema, FieldDescriptor, PhysicalSchema};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::reader::RowIter;
use parquet::record::{Field, Row};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Reads rows of a file in batches, as typed values or canonical strings
pub struct RowReader {
    path: String,
    schema: PhysicalSchema,
    key_value_metadata: BTreeMap<String, String>,
    total_rows: u64,
    rows: Option<RowIter<'static>>,
}

impl RowReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let reader = SerializedFileReader::new(File::open(path)?)?;

        let file_metadata = reader.metadata().file_metadata();
        let schema = resolve_schema(file_metadata)?;
        let key_value_metadata = key_value_map(file_metadata);
        let total_rows = u64::try_from(file_metadata.num_rows()).unwrap_or(0);

        debug!(path = %path_str, columns = schema.len(), total_rows, "Opened row reader");

        Ok(Self {
            path: path_str,
            schema,
            key_value_metadata,
            total_rows,
            rows: Some(reader.into_iter()),
        })
    }

    pub fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    /// File level key/value metadata
    pub fn key_value_metadata(&self) -> &BTreeMap<String, String> {
        &self.key_value_metadata
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Up to `max_rows` rows as canonical strings; fewer at the end of the file
    pub fn next(&mut self, max_rows: usize) -> Result<Vec<Vec<String>>> {
        let batch = self.next_values(max_rows)?;
        Ok(batch
            .iter()
            .map(|values| decode_row(&self.schema, values))
            .collect())
    }

    /// Up to `max_rows` rows as typed values; fewer at the end of the file
    pub fn next_values(&mut self, max_rows: usize) -> Result<Vec<Vec<Value>>> {
        let Some(rows) = self.rows.as_mut() else {
            return Err(Error::end_of_stream(&self.path));
        };

        let mut batch = Vec::with_capacity(max_rows.min(1024));
        for row in rows.take(max_rows) {
            batch.push(row_values(&row?, &self.schema)?);
        }
        Ok(batch)
    }

    /// Release the file. Idempotent.
    pub fn close(&mut self) {
        self.rows = None;
    }
}

fn row_values(row: &Row, schema: &PhysicalSchema) -> Result<Vec<Value>> {
    row.get_column_iter()
        .zip(schema.fields())
        .map(|((_, field), descriptor)| field_value(field, descriptor))
        .collect()
}

fn field_value(field: &Field, descriptor: &FieldDescriptor) -> Result<Value> {
    let value = match field {
        Field::Null => Value::Null,
        Field::Int(v) => Value::Int32(*v),
        Field::Double(v) => Value::Double(*v),
        Field::Str(s) => Value::Utf8(s.clone()),
        Field::Date(days) => date_from_epoch_days(*days)
            .map(Value::Date)
            .ok_or_else(|| Error::Other(format!("day offset {days} is out of range")))?,
        Field::TimestampMillis(millis) => timestamp_from_millis(*millis)
            .map(Value::Timestamp)
            .ok_or_else(|| Error::Other(format!("timestamp {millis} is out of range")))?,
        Field::Decimal(d) => {
            let precision = u8::try_from(d.precision()).unwrap_or(descriptor.decimal_precision());
            let scale = u8::try_from(d.scale()).unwrap_or(descriptor.decimal_scale());
            DecimalValue::from_be_bytes(d.data(), precision, scale)
                .map(Value::Decimal)
                .ok_or_else(|| Error::Other(format!("invalid decimal in column {}", descriptor.id)))?
        }
        other => {
            return Err(Error::unsupported_type(
                &descriptor.id,
                format!("{other:?}"),
            ))
        }
    };
    Ok(value)
}
