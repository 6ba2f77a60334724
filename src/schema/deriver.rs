//! Physical schema derivation from declared field types

use super::types::{
    ColumnKind, FieldDescriptor, FieldMetadata, PhysicalSchema, DEFAULT_SCALE, MAX_PRECISION,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// `number`, `number(p)` or `number(p,s)`
static DECIMAL_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^number\(?(?P<precision>\d*),?\s*(?P<scale>\d*)\)?$")
        .expect("decimal type pattern is valid")
});

/// Precision and scale resolved from a `number` declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub precision: u8,
    pub scale: u8,
    pub default_precision: bool,
    pub default_scale: bool,
}

/// Derive the physical schema for an ordered list of declared fields
pub fn derive_schema(fields: &[FieldMetadata]) -> PhysicalSchema {
    let descriptors = fields
        .iter()
        .enumerate()
        .map(|(index, field)| derive_field(index, field))
        .collect();
    PhysicalSchema::new(descriptors)
}

/// Derive the descriptor of the field at `index`
pub fn derive_field(index: usize, field: &FieldMetadata) -> FieldDescriptor {
    let id = format!("f{index}");
    let declared = field.field_type.trim().to_ascii_lowercase();

    let descriptor = if declared.starts_with("varchar") || declared.starts_with("geometry") {
        FieldDescriptor::new(id, ColumnKind::Utf8)
    } else if declared == "double" {
        FieldDescriptor::new(id, ColumnKind::Double)
    } else if declared == "date" {
        FieldDescriptor::new(id, ColumnKind::Date)
    } else if declared == "time" {
        FieldDescriptor::time(id)
    } else if declared == "timestamp" {
        FieldDescriptor::new(id, ColumnKind::TimestampMillis)
    } else if declared.starts_with("number") {
        let spec = parse_decimal_type(&declared);
        FieldDescriptor {
            default_precision: spec.default_precision,
            default_scale: spec.default_scale,
            ..FieldDescriptor::decimal(id, spec.precision, spec.scale)
        }
    } else {
        debug!(
            field = %field.field_name,
            declared = %field.field_type,
            "unrecognized declared type, storing as INT32"
        );
        FieldDescriptor::new(id, ColumnKind::Int32)
    };

    descriptor.with_source_name(field.field_name.clone())
}

/// Resolve precision and scale of a `number` declaration.
///
/// Missing parts fall back to the defaults and are flagged. A precision above
/// the maximum resets both to the defaults; the scale never exceeds the
/// precision. Malformed declarations use the defaults.
pub fn parse_decimal_type(declared: &str) -> DecimalSpec {
    let (precision, scale) = match DECIMAL_TYPE_REGEX.captures(declared) {
        Some(caps) => (
            parse_digits(caps.name("precision").map_or("", |m| m.as_str())),
            parse_digits(caps.name("scale").map_or("", |m| m.as_str())),
        ),
        None => {
            debug!(declared, "malformed number declaration, using default precision and scale");
            (None, None)
        }
    };

    let default_precision = precision.is_none();
    let default_scale = scale.is_none();
    let mut precision = precision.unwrap_or(u64::from(MAX_PRECISION));
    let mut scale = scale.unwrap_or(u64::from(DEFAULT_SCALE));

    if precision > u64::from(MAX_PRECISION) {
        precision = u64::from(MAX_PRECISION);
        scale = u64::from(DEFAULT_SCALE);
    }
    scale = scale.min(precision);

    DecimalSpec {
        precision: precision as u8,
        scale: scale as u8,
        default_precision,
        default_scale,
    }
}

/// Empty means absent; digit runs too long for u64 count as oversized
fn parse_digits(digits: &str) -> Option<u64> {
    if digits.is_empty() {
        None
    } else {
        Some(digits.parse().unwrap_or(u64::MAX))
    }
}
