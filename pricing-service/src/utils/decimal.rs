//! Permissive decimal parsing and fixed-precision rounding.
//!
//! Rule fields are free text edited keystroke by keystroke, so parsing never
//! fails: it reads the longest numeric prefix and otherwise falls back.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse the leading numeric prefix of `text`.
///
/// Accepts an optional sign, digits with an optional fractional part, and an
/// optional exponent. Anything after the prefix is ignored (`"12abc"` is 12,
/// `"1."` is 1). Returns `None` for blank text or text without leading digits.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &text[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &text[frac_start..frac_end];
        pos = frac_end;
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut canonical = String::with_capacity(pos + 2);
    if negative {
        canonical.push('-');
    }
    canonical.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        canonical.push('.');
        canonical.push_str(frac_digits);
    }

    match exponent(&bytes[pos..]) {
        Some(exp) => Decimal::from_scientific(&format!("{}e{}", canonical, exp)).ok(),
        None => Decimal::from_str(&canonical).ok(),
    }
}

/// Exponent suffix (`e5`, `E-2`) at the start of `rest`, if well formed.
fn exponent(rest: &[u8]) -> Option<String> {
    if !matches!(rest.first(), Some(b'e' | b'E')) {
        return None;
    }
    let mut pos = 1;
    let mut exp = String::new();
    if let Some(sign @ (b'+' | b'-')) = rest.get(pos) {
        if *sign == b'-' {
            exp.push('-');
        }
        pos += 1;
    }
    let digits_start = pos;
    while pos < rest.len() && rest[pos].is_ascii_digit() {
        exp.push(rest[pos] as char);
        pos += 1;
    }
    (pos > digits_start).then_some(exp)
}

/// Parse `text`, substituting `fallback` when nothing numeric can be read.
pub fn parse_decimal_or_default(text: &str, fallback: Decimal) -> Decimal {
    parse_decimal(text).unwrap_or(fallback)
}

/// Round to cents, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to one decimal place, half away from zero.
pub fn round1(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}
