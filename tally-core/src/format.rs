//! en-US number rendering
//!
//! Grouping with `,`, `.` as decimal separator, fraction digits bounded by a
//! minimum and a maximum with trailing zeros trimmed down to the minimum.

/// Placeholder shown for values that are not available.
pub const UNAVAILABLE: &str = "—";

/// Render with grouping and at most `max_fraction_digits` decimals.
pub fn format_grouped(value: f64, max_fraction_digits: usize) -> String {
    format_locale(value, 0, max_fraction_digits)
}

/// Render with grouping, padding to `min` and rounding to `max` decimals.
pub fn format_locale(value: f64, min_fraction_digits: usize, max_fraction_digits: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "∞".to_string()
        } else {
            "-∞".to_string()
        };
    }

    let max = max_fraction_digits.max(min_fraction_digits);
    let fixed = format!("{:.*}", max, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (fixed.as_str(), ""),
    };

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_fraction_digits {
        frac.push('0');
    }

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac.bytes().all(|b| b == b'0');
    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// `Number.prototype.toFixed` equivalent: no grouping, exact digit count.
pub fn format_fixed(value: f64, digits: usize) -> String {
    format!("{:.*}", digits, value)
}

/// US dollar amount, two decimals, sign before the symbol.
pub fn format_usd(value: f64) -> String {
    let body = format_locale(value.abs(), 2, 2);
    if value.is_sign_negative() && body != "0.00" {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
