//! Typed values

use arrow::datatypes::{Decimal128Type, DecimalType};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

use super::temporal::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::schema::{DECIMAL_BYTE_WIDTH, MAX_PRECISION};

/// A typed value as stored in, or read from, a column
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int32(i32),
    Double(f64),
    Utf8(String),
    Date(NaiveDate),
    /// UTC wall clock time with millisecond resolution
    Timestamp(NaiveDateTime),
    Decimal(DecimalValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Utf8(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Value::Timestamp(v) => write!(f, "{}", v.format(TIMESTAMP_FORMAT)),
            Value::Decimal(v) => write!(f, "{v}"),
        }
    }
}

// ============================================================================
// Decimal
// ============================================================================

/// Fixed-point decimal: `unscaled * 10^-scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalValue {
    unscaled: i128,
    precision: u8,
    scale: u8,
}

impl DecimalValue {
    /// `None` when the value has more digits than `precision` allows
    pub fn try_new(unscaled: i128, precision: u8, scale: u8) -> Option<Self> {
        Decimal128Type::validate_decimal_precision(unscaled, precision.min(MAX_PRECISION)).ok()?;
        Some(Self {
            unscaled,
            precision,
            scale,
        })
    }

    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Plain notation at the declared scale (`12.50` for scale 2)
    pub fn to_plain_string(&self) -> String {
        Decimal128Type::format_decimal(self.unscaled, MAX_PRECISION, self.scale as i8)
    }

    /// Plain notation without trailing fractional zeros (`12.5`, `3`)
    pub fn to_stripped_string(&self) -> String {
        let plain = self.to_plain_string();
        if !plain.contains('.') {
            return plain;
        }
        plain
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }

    /// 16-byte big-endian two's complement
    pub fn to_fixed_bytes(&self) -> [u8; DECIMAL_BYTE_WIDTH as usize] {
        self.unscaled.to_be_bytes()
    }

    /// Sign-extend a big-endian two's complement value of at most 16 bytes
    pub fn from_be_bytes(bytes: &[u8], precision: u8, scale: u8) -> Option<Self> {
        const WIDTH: usize = DECIMAL_BYTE_WIDTH as usize;
        if bytes.is_empty() || bytes.len() > WIDTH {
            return None;
        }
        let fill = if bytes[0] & 0x80 == 0 { 0x00 } else { 0xFF };
        let mut buf = [fill; WIDTH];
        buf[WIDTH - bytes.len()..].copy_from_slice(bytes);
        Self::try_new(i128::from_be_bytes(buf), precision, scale)
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}
