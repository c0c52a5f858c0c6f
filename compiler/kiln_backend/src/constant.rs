//! Integer literal materialization.

use std::num::IntErrorKind;

use crate::BackendError;

/// Bit mask covering the low `bits` bits.
#[inline]
pub(crate) fn mask(bits: u32) -> u128 {
    if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

/// Interpret the low `bits` bits of `raw` as a two's complement value.
#[allow(
    clippy::cast_possible_wrap,
    reason = "reinterpreting a bit pattern is the point"
)]
pub(crate) fn sign_extend(raw: u128, bits: u32) -> i128 {
    if bits >= 128 {
        raw as i128
    } else {
        let shift = 128 - bits;
        ((raw << shift) as i128) >> shift
    }
}

/// Parse `text` as an integer of the given width and signedness.
///
/// Accepts an optional sign followed by decimal digits or a `0x` hex body.
/// Returns the value's bit pattern truncated to `bits`. Text whose value
/// does not fit the type is rejected, never wrapped.
pub fn parse_int_literal(text: &str, bits: u32, signed: bool) -> Result<u128, BackendError> {
    debug_assert!((1..=128).contains(&bits), "unsupported width {bits}");

    let invalid = || BackendError::InvalidLiteral(text.to_owned());
    let out_of_range = || BackendError::LiteralOutOfRange {
        text: text.to_owned(),
        ty: format!("{}{bits}", if signed { 'i' } else { 'u' }),
    };

    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, body),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }

    let magnitude = u128::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => out_of_range(),
        _ => invalid(),
    })?;

    let fits = if signed {
        let max_positive = mask(bits - 1);
        if negative {
            magnitude <= max_positive + 1
        } else {
            magnitude <= max_positive
        }
    } else {
        magnitude <= mask(bits) && (!negative || magnitude == 0)
    };
    if !fits {
        return Err(out_of_range());
    }

    let value = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    Ok(value & mask(bits))
}

#[cfg(test)]
mod tests;
