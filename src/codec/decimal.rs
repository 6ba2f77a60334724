//! Decimal literal parsing
//!
//! Literals are arbitrary-precision (`-1234.5678`, `1.5e3`, `+.25`). They are
//! rescaled to the column scale by truncating toward zero and must then fit
//! the column precision.

use super::types::DecimalValue;

/// Parse a decimal literal into a value of the given precision and scale
pub fn parse_truncated(literal: &str, precision: u8, scale: u8) -> Result<DecimalValue, String> {
    let (negative, body) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => {
            let exponent = body[pos + 1..]
                .parse::<i32>()
                .map_err(|_| "malformed exponent".to_string())?;
            (&body[..pos], exponent)
        }
        None => (body, 0),
    };

    let (integral, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if integral.is_empty() && fraction.is_empty() {
        return Err("no digits".to_string());
    }
    if !integral.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err("unexpected character".to_string());
    }

    // value = digits * 10^(exponent - fraction.len()); rescale to `scale`
    let shift = i64::from(exponent) - fraction.len() as i64 + i64::from(scale);
    let digits: Vec<u8> = integral.bytes().chain(fraction.bytes()).collect();

    let kept = if shift < 0 {
        let dropped = usize::try_from(shift.unsigned_abs()).unwrap_or(usize::MAX);
        &digits[..digits.len().saturating_sub(dropped)]
    } else {
        &digits[..]
    };

    let out_of_range = || format!("value does not fit precision {precision}");

    let mut unscaled: i128 = 0;
    for digit in kept {
        unscaled = unscaled
            .checked_mul(10)
            .and_then(|v| v.checked_add(i128::from(digit - b'0')))
            .ok_or_else(out_of_range)?;
    }

    if shift > 0 && unscaled != 0 {
        let factor = u32::try_from(shift)
            .ok()
            .and_then(|exp| 10_i128.checked_pow(exp))
            .ok_or_else(out_of_range)?;
        unscaled = unscaled.checked_mul(factor).ok_or_else(out_of_range)?;
    }

    if negative {
        unscaled = -unscaled;
    }

    DecimalValue::try_new(unscaled, precision, scale).ok_or_else(out_of_range)
}
