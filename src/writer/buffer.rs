//! Per-column row buffers flushed as one row group

use crate::codec::{epoch_days, epoch_millis, Value};
use crate::error::{Error, Result};
use crate::schema::ColumnKind;
use parquet::data_type::{
    ByteArray, ByteArrayType, DataType, DoubleType, FixedLenByteArray, FixedLenByteArrayType,
    Int32Type, Int64Type,
};
use parquet::file::writer::SerializedColumnWriter;

/// Non-null values plus one definition level per row
#[derive(Debug)]
pub(crate) struct TypedBuffer<T> {
    values: Vec<T>,
    def_levels: Vec<i16>,
}

impl<T> TypedBuffer<T> {
    fn new() -> Self {
        Self {
            values: Vec::new(),
            def_levels: Vec::new(),
        }
    }

    fn push(&mut self, value: Option<T>) {
        match value {
            Some(v) => {
                self.values.push(v);
                self.def_levels.push(1);
            }
            None => self.def_levels.push(0),
        }
    }

    fn clear(&mut self) {
        self.values.clear();
        self.def_levels.clear();
    }

    fn write<D>(&mut self, column: &mut SerializedColumnWriter<'_>) -> Result<()>
    where
        D: DataType<T = T>,
    {
        column
            .typed::<D>()
            .write_batch(self.values.as_slice(), Some(self.def_levels.as_slice()), None)?;
        self.clear();
        Ok(())
    }
}

/// Buffer for one column, typed by its storage kind
#[derive(Debug)]
pub(crate) enum ColumnBuffer {
    Utf8(TypedBuffer<ByteArray>),
    Double(TypedBuffer<f64>),
    Int32(TypedBuffer<i32>),
    Date(TypedBuffer<i32>),
    Timestamp(TypedBuffer<i64>),
    Decimal(TypedBuffer<FixedLenByteArray>),
}

impl ColumnBuffer {
    pub(crate) fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Utf8 => Self::Utf8(TypedBuffer::new()),
            ColumnKind::Double => Self::Double(TypedBuffer::new()),
            ColumnKind::Int32 => Self::Int32(TypedBuffer::new()),
            ColumnKind::Date => Self::Date(TypedBuffer::new()),
            ColumnKind::TimestampMillis => Self::Timestamp(TypedBuffer::new()),
            ColumnKind::Decimal => Self::Decimal(TypedBuffer::new()),
        }
    }

    /// Append one value; a value of another kind is rejected
    pub(crate) fn push(&mut self, value: Value) -> Result<()> {
        match (self, value) {
            (Self::Utf8(b), Value::Null) => b.push(None),
            (Self::Double(b), Value::Null) => b.push(None),
            (Self::Int32(b), Value::Null) | (Self::Date(b), Value::Null) => b.push(None),
            (Self::Timestamp(b), Value::Null) => b.push(None),
            (Self::Decimal(b), Value::Null) => b.push(None),
            (Self::Utf8(b), Value::Utf8(s)) => b.push(Some(ByteArray::from(s.into_bytes()))),
            (Self::Double(b), Value::Double(v)) => b.push(Some(v)),
            (Self::Int32(b), Value::Int32(v)) => b.push(Some(v)),
            (Self::Date(b), Value::Date(d)) => b.push(Some(epoch_days(d))),
            (Self::Timestamp(b), Value::Timestamp(ts)) => b.push(Some(epoch_millis(ts))),
            (Self::Decimal(b), Value::Decimal(d)) => {
                b.push(Some(FixedLenByteArray::from(d.to_fixed_bytes().to_vec())));
            }
            (buffer, value) => {
                return Err(Error::Other(format!(
                    "value {value:?} cannot be stored in a {} column",
                    buffer.kind_name()
                )))
            }
        }
        Ok(())
    }

    /// Write buffered values into the row group column and empty the buffer
    pub(crate) fn write_to(&mut self, column: &mut SerializedColumnWriter<'_>) -> Result<()> {
        match self {
            Self::Utf8(b) => b.write::<ByteArrayType>(column),
            Self::Double(b) => b.write::<DoubleType>(column),
            Self::Int32(b) | Self::Date(b) => b.write::<Int32Type>(column),
            Self::Timestamp(b) => b.write::<Int64Type>(column),
            Self::Decimal(b) => b.write::<FixedLenByteArrayType>(column),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Utf8(_) => "UTF8",
            Self::Double(_) => "DOUBLE",
            Self::Int32(_) => "INT32",
            Self::Date(_) => "DATE",
            Self::Timestamp(_) => "TIMESTAMP_MILLIS",
            Self::Decimal(_) => "DECIMAL",
        }
    }
}
