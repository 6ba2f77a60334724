//! Typed value -> canonical string

use super::temporal::{DATE_FORMAT, TIMESTAMP_FORMAT};
use super::types::Value;
use crate::schema::FieldDescriptor;

/// Most fractional digits rendered for a double
const MAX_DOUBLE_FRACTION_DIGITS: usize = 15;

pub(super) fn decode_utf8(_field: &FieldDescriptor, value: &Value) -> String {
    match value {
        Value::Utf8(text) => escape_csv(text),
        other => other.to_string(),
    }
}

pub(super) fn decode_int32(_field: &FieldDescriptor, value: &Value) -> String {
    value.to_string()
}

pub(super) fn decode_double(_field: &FieldDescriptor, value: &Value) -> String {
    match value {
        Value::Double(v) => format_double(*v),
        other => other.to_string(),
    }
}

pub(super) fn decode_decimal(field: &FieldDescriptor, value: &Value) -> String {
    match value {
        Value::Decimal(d) if field.default_scale => d.to_stripped_string(),
        Value::Decimal(d) => d.to_plain_string(),
        other => other.to_string(),
    }
}

pub(super) fn decode_date(_field: &FieldDescriptor, value: &Value) -> String {
    match value {
        Value::Date(date) => date.format(DATE_FORMAT).to_string(),
        other => other.to_string(),
    }
}

pub(super) fn decode_timestamp(field: &FieldDescriptor, value: &Value) -> String {
    let Value::Timestamp(ts) = value else {
        return value.to_string();
    };

    let text = ts.format(TIMESTAMP_FORMAT).to_string();
    if field.time_of_day {
        let time = text.get(11..).unwrap_or(&text);
        time.strip_suffix(".000").unwrap_or(time).to_string()
    } else {
        match text.strip_suffix(".000") {
            Some(head) => format!("{head}.0"),
            None => text,
        }
    }
}

/// Plain notation, at most 15 fractional digits, no `.0` on integral values
pub fn format_double(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let shortest = value.to_string();
    let too_long = shortest
        .split_once('.')
        .is_some_and(|(_, fraction)| fraction.len() > MAX_DOUBLE_FRACTION_DIGITS);

    let text = if too_long {
        let rounded = format!("{value:.digits$}", digits = MAX_DOUBLE_FRACTION_DIGITS);
        rounded
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        shortest
    };

    match text.strip_suffix(".0") {
        Some(integral) => integral.to_string(),
        None => text,
    }
}

/// Quote a field when it contains a separator, quote, or line break
pub fn escape_csv(text: &str) -> String {
    if text.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
