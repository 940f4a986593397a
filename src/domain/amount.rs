//! Conversion between human-readable amounts and integer base units.

use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Scale a decimal string such as `"1.5"` to base units with `decimals`
/// fractional digits. Digits beyond `decimals` are truncated.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the string is not a non-negative decimal or
/// the scaled value does not fit in 256 bits.
pub fn from_ui_string(amount: &str, decimals: i32) -> Result<U256> {
    let trimmed = amount.trim();
    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| Error::Parse(format!("invalid amount {trimmed:?}: {e}")))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::Parse(format!("negative amount {trimmed:?}")));
    }

    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let shift = i64::from(decimals) - i64::from(value.scale());
    let overflow = || Error::Parse(format!("amount {trimmed:?} overflows at {decimals} decimals"));

    if shift >= 0 {
        let factor = pow10(shift).ok_or_else(overflow)?;
        mantissa.checked_mul(factor).ok_or_else(overflow)
    } else {
        match pow10(-shift) {
            Some(divisor) => Ok(mantissa / divisor),
            None => Ok(U256::ZERO),
        }
    }
}

/// Render base units as a decimal string with `decimals` fractional digits,
/// trailing zeros removed.
#[must_use]
pub fn to_ui_string(value: U256, decimals: i32) -> String {
    let digits = value.to_string();
    let decimals = usize::try_from(decimals).unwrap_or(0);
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// Parse an integer that a node returned as a decimal or `0x` hex string.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the text is not an unsigned integer.
pub fn parse_u256(text: &str) -> Result<U256> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) if hex.is_empty() => Ok(U256::ZERO),
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(text, 10),
    };
    parsed.map_err(|e| Error::Parse(format!("invalid integer {text:?}: {e}")))
}

fn pow10(exp: i64) -> Option<U256> {
    let exp = u64::try_from(exp).ok()?;
    if exp > 77 {
        return None;
    }
    U256::from(10u8).checked_pow(U256::from(exp))
}
