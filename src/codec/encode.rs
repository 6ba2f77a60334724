//! Canonical string -> typed value

use super::decimal::parse_truncated;
use super::temporal::{
    parse_date, parse_timestamp, strip_single_quotes, truncate_to_millis, EPOCH_DATE_PREFIX,
};
use super::types::Value;
use crate::error::FieldEncodeError;
use crate::schema::FieldDescriptor;

type EncodeResult = std::result::Result<Value, FieldEncodeError>;

/// Strip `,` grouping separators
fn remove_grouping(input: &str) -> String {
    input.replace(',', "")
}

pub(super) fn encode_utf8(_field: &FieldDescriptor, input: &str) -> EncodeResult {
    if input.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Utf8(input.to_string()))
    }
}

pub(super) fn encode_int32(_field: &FieldDescriptor, input: &str) -> EncodeResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    trimmed
        .parse::<i32>()
        .map(Value::Int32)
        .map_err(|_| FieldEncodeError::InvalidNumericLiteral {
            value: trimmed.to_string(),
            expected: "integer",
        })
}

pub(super) fn encode_double(_field: &FieldDescriptor, input: &str) -> EncodeResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    let cleaned = remove_grouping(trimmed);
    cleaned
        .parse::<f64>()
        .map(Value::Double)
        .map_err(|_| FieldEncodeError::InvalidNumericLiteral {
            value: cleaned,
            expected: "double",
        })
}

pub(super) fn encode_decimal(field: &FieldDescriptor, input: &str) -> EncodeResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    let cleaned = remove_grouping(trimmed);
    parse_truncated(&cleaned, field.decimal_precision(), field.decimal_scale())
        .map(Value::Decimal)
        .map_err(|reason| FieldEncodeError::InvalidDecimalLiteral {
            value: cleaned,
            reason,
        })
}

pub(super) fn encode_date(_field: &FieldDescriptor, input: &str) -> EncodeResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    let unquoted = strip_single_quotes(trimmed);
    parse_date(unquoted)
        .map(Value::Date)
        .ok_or_else(|| FieldEncodeError::InvalidDateLiteral {
            value: unquoted.to_string(),
        })
}

pub(super) fn encode_timestamp(field: &FieldDescriptor, input: &str) -> EncodeResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let mut text = strip_single_quotes(trimmed).to_string();
    if !text.contains('.') {
        text.push_str(".000");
    }
    // Published values already carry a date and end with 'Z'
    if field.time_of_day && !text.ends_with('Z') {
        text.insert_str(0, EPOCH_DATE_PREFIX);
    }

    parse_timestamp(&text)
        .and_then(truncate_to_millis)
        .map(Value::Timestamp)
        .ok_or(FieldEncodeError::InvalidTimestampLiteral { value: text })
}
