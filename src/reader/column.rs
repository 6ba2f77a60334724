//! Streaming reader over a single column

use crate::codec::{date_from_epoch_days, timestamp_from_millis, DecimalValue, Value};
use crate::error::{Error, Result};
use crate::schema::{
    descriptor_from_column, persisted_schema, storage_type_name, ColumnKind, FieldDescriptor,
};
use parquet::column::reader::{ColumnReader as ParquetColumnReader, ColumnReaderImpl};
use parquet::data_type::DataType;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Reads one column value by value, crossing row groups transparently.
///
/// Values are decoded according to the column's storage kind. Null values
/// are returned as [`Value::Null`].
pub struct ColumnStreamReader {
    path: String,
    column: String,
    column_index: usize,
    /// `None` when the storage kind is not one this crate reads
    field: Option<FieldDescriptor>,
    storage_type: String,
    reader: Option<SerializedFileReader<File>>,
    cursor: Option<RowGroupCursor>,
    next_row_group: usize,
    total_rows: u64,
    rows_read: u64,
}

impl ColumnStreamReader {
    /// Open `column` of the file at `path`.
    ///
    /// Fails with [`Error::ColumnNotFound`] when the file has no such column.
    pub fn open(path: impl AsRef<Path>, column: &str) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let reader = SerializedFileReader::new(File::open(path)?)?;

        let metadata = reader.metadata();
        let file_metadata = metadata.file_metadata();
        let descr = file_metadata.schema_descr();

        let column_index = descr
            .columns()
            .iter()
            .position(|c| c.name() == column)
            .ok_or_else(|| Error::column_not_found(column, &path_str))?;
        let column_descr = descr.column(column_index);

        // Persisted flags (time of day, default scale) take precedence
        let field = persisted_schema(file_metadata)
            .and_then(|schema| schema.field(column_index).cloned())
            .or_else(|| descriptor_from_column(&column_descr));

        let total_rows = u64::try_from(file_metadata.num_rows()).unwrap_or(0);
        debug!(
            path = %path_str,
            column,
            row_groups = metadata.num_row_groups(),
            total_rows,
            "Opened column reader"
        );

        Ok(Self {
            path: path_str,
            column: column.to_string(),
            column_index,
            field,
            storage_type: storage_type_name(&column_descr),
            reader: Some(reader),
            cursor: None,
            next_row_group: 0,
            total_rows,
            rows_read: 0,
        })
    }

    /// Column name
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Storage kind, `None` for kinds this crate does not read
    pub fn kind(&self) -> Option<ColumnKind> {
        self.field.as_ref().map(|f| f.kind)
    }

    /// Descriptor used to decode values
    pub fn field(&self) -> Option<&FieldDescriptor> {
        self.field.as_ref()
    }

    /// Record count of the file
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    pub fn has_next(&self) -> bool {
        self.rows_read < self.total_rows
    }

    /// Read the next value.
    ///
    /// Fails with [`Error::EndOfStream`] once every row has been read.
    pub fn next_value(&mut self) -> Result<Value> {
        if !self.has_next() {
            return Err(Error::end_of_stream(&self.path));
        }
        let Some(field) = self.field.as_ref() else {
            return Err(Error::unsupported_type(&self.column, &self.storage_type));
        };

        while self.cursor.as_ref().map_or(true, RowGroupCursor::is_exhausted) {
            let reader = self
                .reader
                .as_ref()
                .ok_or_else(|| Error::end_of_stream(&self.path))?;
            if self.next_row_group >= reader.num_row_groups() {
                return Err(Error::end_of_stream(&self.path));
            }

            let row_group = reader.get_row_group(self.next_row_group)?;
            let row_count = u64::try_from(row_group.metadata().num_rows()).unwrap_or(0);
            debug!(
                column = %self.column,
                row_group = self.next_row_group,
                rows = row_count,
                "Advancing to row group"
            );
            self.cursor = Some(RowGroupCursor::new(
                row_group.get_column_reader(self.column_index)?,
                row_count,
            ));
            self.next_row_group += 1;
        }

        let cursor = self
            .cursor
            .as_mut()
            .ok_or_else(|| Error::end_of_stream(&self.path))?;
        let value = cursor.read_value(field, &self.column)?;
        cursor.position += 1;
        self.rows_read += 1;
        Ok(value)
    }

    /// Release the file. Idempotent.
    pub fn close(&mut self) {
        self.cursor = None;
        self.reader = None;
    }
}

impl Iterator for ColumnStreamReader {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.next_value())
        } else {
            None
        }
    }
}

// ============================================================================
// Row group cursor
// ============================================================================

struct RowGroupCursor {
    reader: ParquetColumnReader,
    row_count: u64,
    position: u64,
    def_levels: Vec<i16>,
}

impl RowGroupCursor {
    fn new(reader: ParquetColumnReader, row_count: u64) -> Self {
        Self {
            reader,
            row_count,
            position: 0,
            def_levels: Vec::with_capacity(1),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.row_count
    }

    fn read_value(&mut self, field: &FieldDescriptor, column: &str) -> Result<Value> {
        let defs = &mut self.def_levels;
        let value = match (&mut self.reader, field.kind) {
            (ParquetColumnReader::Int32ColumnReader(r), ColumnKind::Int32) => {
                read_one(r, defs)?.map(Value::Int32)
            }
            (ParquetColumnReader::Int32ColumnReader(r), ColumnKind::Date) => read_one(r, defs)?
                .map(|days| {
                    date_from_epoch_days(days)
                        .map(Value::Date)
                        .ok_or_else(|| Error::Other(format!("day offset {days} is out of range")))
                })
                .transpose()?,
            (ParquetColumnReader::DoubleColumnReader(r), ColumnKind::Double) => {
                read_one(r, defs)?.map(Value::Double)
            }
            (ParquetColumnReader::Int64ColumnReader(r), ColumnKind::TimestampMillis) => {
                read_one(r, defs)?
                    .map(|millis| {
                        timestamp_from_millis(millis)
                            .map(Value::Timestamp)
                            .ok_or_else(|| {
                                Error::Other(format!("timestamp {millis} is out of range"))
                            })
                    })
                    .transpose()?
            }
            (ParquetColumnReader::ByteArrayColumnReader(r), ColumnKind::Utf8) => read_one(r, defs)?
                .map(|bytes| {
                    bytes
                        .as_utf8()
                        .map(|s| Value::Utf8(s.to_string()))
                        .map_err(Error::from)
                })
                .transpose()?,
            (ParquetColumnReader::FixedLenByteArrayColumnReader(r), ColumnKind::Decimal) => {
                read_one(r, defs)?
                    .map(|bytes| decimal_from_bytes(bytes.data(), field))
                    .transpose()?
            }
            (ParquetColumnReader::ByteArrayColumnReader(r), ColumnKind::Decimal) => {
                read_one(r, defs)?
                    .map(|bytes| decimal_from_bytes(bytes.data(), field))
                    .transpose()?
            }
            _ => return Err(Error::unsupported_type(column, field.kind.storage_name())),
        };
        Ok(value.unwrap_or(Value::Null))
    }
}

/// Read exactly one record; `None` when it is null
fn read_one<T: DataType>(
    reader: &mut ColumnReaderImpl<T>,
    def_levels: &mut Vec<i16>,
) -> Result<Option<T::T>> {
    def_levels.clear();
    let mut values = Vec::with_capacity(1);
    let (records, _, _) = reader.read_records(1, Some(&mut *def_levels), None, &mut values)?;
    if records == 0 {
        return Err(Error::Other("column chunk ended before its row count".into()));
    }

    // Required columns produce no levels
    if def_levels.first().is_some_and(|level| *level == 0) {
        return Ok(None);
    }
    Ok(values.pop())
}

fn decimal_from_bytes(bytes: &[u8], field: &FieldDescriptor) -> Result<Value> {
    DecimalValue::from_be_bytes(bytes, field.decimal_precision(), field.decimal_scale())
        .map(Value::Decimal)
        .ok_or_else(|| {
            Error::Other(format!(
                "{} bytes do not hold a decimal of precision {}",
                bytes.len(),
                field.decimal_precision()
            ))
        })
}
