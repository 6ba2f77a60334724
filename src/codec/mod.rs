//! Canonical value codec
//!
//! Converts between canonical strings and typed column values.
//!
//! # Overview
//!
//! - `encode_field` - canonical string to [`Value`], per column kind
//! - `decode_field` - [`Value`] to canonical string, per column kind
//!
//! The empty string is the canonical form of null for every kind. Encode
//! failures are returned as [`FieldEncodeError`] so callers can record them
//! and keep going.

mod decimal;
mod decode;
mod encode;
mod temporal;
mod types;

pub use decimal::parse_truncated;
pub use decode::{escape_csv, format_double};
pub use temporal::{
    date_from_epoch_days, epoch_days, epoch_millis, timestamp_from_millis, DATE_FORMAT,
    TIMESTAMP_FORMAT,
};
pub use types::{DecimalValue, Value};

use crate::error::FieldEncodeError;
use crate::schema::{ColumnKind, FieldDescriptor, PhysicalSchema};

type EncodeFn = fn(&FieldDescriptor, &str) -> Result<Value, FieldEncodeError>;
type DecodeFn = fn(&FieldDescriptor, &Value) -> String;

/// Encode and decode functions of one column kind
pub struct KindCodec {
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

static UTF8: KindCodec = KindCodec {
    encode: encode::encode_utf8,
    decode: decode::decode_utf8,
};
static DOUBLE: KindCodec = KindCodec {
    encode: encode::encode_double,
    decode: decode::decode_double,
};
static INT32: KindCodec = KindCodec {
    encode: encode::encode_int32,
    decode: decode::decode_int32,
};
static DATE: KindCodec = KindCodec {
    encode: encode::encode_date,
    decode: decode::decode_date,
};
static TIMESTAMP: KindCodec = KindCodec {
    encode: encode::encode_timestamp,
    decode: decode::decode_timestamp,
};
static DECIMAL: KindCodec = KindCodec {
    encode: encode::encode_decimal,
    decode: decode::decode_decimal,
};

/// Codec for a column kind
pub fn codec_for(kind: ColumnKind) -> &'static KindCodec {
    match kind {
        ColumnKind::Utf8 => &UTF8,
        ColumnKind::Double => &DOUBLE,
        ColumnKind::Int32 => &INT32,
        ColumnKind::Date => &DATE,
        ColumnKind::TimestampMillis => &TIMESTAMP,
        ColumnKind::Decimal => &DECIMAL,
    }
}

/// Encode one canonical field
pub fn encode_field(field: &FieldDescriptor, input: &str) -> Result<Value, FieldEncodeError> {
    (codec_for(field.kind).encode)(field, input)
}

/// Decode one typed value; null is always the empty string
pub fn decode_field(field: &FieldDescriptor, value: &Value) -> String {
    if value.is_null() {
        return String::new();
    }
    (codec_for(field.kind).decode)(field, value)
}

/// Decode a row of values against a schema
pub fn decode_row(schema: &PhysicalSchema, values: &[Value]) -> Vec<String> {
    schema
        .fields()
        .iter()
        .zip(values)
        .map(|(field, value)| decode_field(field, value))
        .collect()
}
