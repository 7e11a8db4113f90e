//! Numeric literal parsing
//!
//! Two flavours: a strict parser for literals that appear inside expressions
//! and a lenient prefix parser for raw form input, which takes the longest
//! numeric prefix and ignores whatever trails it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    InvalidFormat(String),

    #[error("Number is not finite: {0}")]
    NonFinite(f64),
}

/// Parse a complete numeric literal (`12`, `0.5`, `.5`, `1e-3`).
pub fn parse_number(s: &str) -> Result<f64, NumberError> {
    let s = s.trim();
    let valid_chars = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !valid_chars {
        return Err(NumberError::InvalidFormat(s.to_string()));
    }
    let value: f64 = s
        .parse()
        .map_err(|_| NumberError::InvalidFormat(s.to_string()))?;
    if !value.is_finite() {
        return Err(NumberError::NonFinite(value));
    }
    Ok(value)
}

/// Parse the longest numeric prefix of raw input, the way browsers read a
/// number out of a text box. Returns `None` when no digits lead the input.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return Some(if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}
