//! Token normalisation, unit resolution and slug parsing

use std::sync::LazyLock;

use regex::Regex;
use tally_core::parse_float_prefix;

use crate::convert::{ConversionContext, ConversionError};
use crate::units::UNITS;
use crate::UnitDefinition;

const SLUG_SUFFIXES: [&str; 3] = ["-converter", "-calculator", "-conversion"];

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+?)-to-(.+)").expect("slug pattern is valid"));

/// Lowercase, collapse every run of non-alphanumerics to one space, trim.
///
/// `"Square-Feet"` and `"square_feet"` both become `"square feet"`.
pub fn normalize_token(token: &str) -> String {
    let lower = token.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut pending_space = false;
    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Exact, case-sensitive lookup by unit id
pub fn get_unit_by_id(id: &str) -> Option<&'static UnitDefinition> {
    UNITS.get(id)
}

/// Resolve a free-form token through the alias table
pub fn resolve_unit(token: &str) -> Option<&'static UnitDefinition> {
    UNITS.resolve(token)
}

/// Parse `{from}-to-{to}[-converter|-calculator|-conversion]` into a context.
///
/// Returns `None` when either side fails to resolve or the kinds differ.
pub fn parse_conversion_from_slug(slug: &str) -> Option<ConversionContext> {
    try_parse_slug(slug).ok()
}

/// [`parse_conversion_from_slug`] with the reason for failure
pub fn try_parse_slug(slug: &str) -> Result<ConversionContext, ConversionError> {
    let (from, to) = extract_unit_tokens(slug).ok_or_else(|| ConversionError::MalformedSlug(slug.to_string()))?;
    let from_unit = resolve_unit(from).ok_or_else(|| ConversionError::UnknownUnit(from.to_string()))?;
    let to_unit = resolve_unit(to).ok_or_else(|| ConversionError::UnknownUnit(to.to_string()))?;
    ConversionContext::new(from_unit, to_unit)
}

fn extract_unit_tokens(slug: &str) -> Option<(&str, &str)> {
    let mut sanitized = slug;
    for suffix in SLUG_SUFFIXES {
        if let Some(stripped) = sanitized.strip_suffix(suffix) {
            sanitized = stripped;
        }
    }

    let caps = SLUG_PATTERN.captures(sanitized)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Clean user-typed amounts: `"1,500"`, `"2.5k"`, `"3M"`, `"1b"`.
///
/// Commas and whitespace are dropped and a trailing `k`/`m`/`b` scales by a
/// thousand, million or billion. Input that still has no numeric prefix comes
/// back unchanged.
pub fn sanitize_input(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut value: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let factor = match value.chars().last() {
        Some('k') => 1e3,
        Some('m') => 1e6,
        Some('b') => 1e9,
        _ => 1.0,
    };
    if factor != 1.0 {
        value.pop();
    }

    match parse_float_prefix(&value) {
        Some(parsed) => (parsed * factor).to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitKind;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("Square-Feet"), "square feet");
        assert_eq!(normalize_token("  kg/m3 "), "kg m3");
        assert_eq!(normalize_token("°C"), "c");
        assert_eq!(normalize_token("__"), "");
    }

    #[test]
    fn test_slug_parsing() {
        let ctx = parse_conversion_from_slug("meters-to-feet-converter").unwrap();
        assert_eq!(ctx.from().id, "meter");
        assert_eq!(ctx.to().id, "foot");
        assert_eq!(ctx.kind(), UnitKind::Length);

        let ctx = parse_conversion_from_slug("celsius-to-fahrenheit").unwrap();
        assert_eq!(ctx.to().id, "fahrenheit");

        let ctx = parse_conversion_from_slug("square-feet-to-acres-calculator").unwrap();
        assert_eq!(ctx.from().id, "square_foot");
        assert_eq!(ctx.to().id, "acre");
    }

    #[test]
    fn test_slug_rejects_cross_kind() {
        assert!(parse_conversion_from_slug("meters-to-kilograms-converter").is_none());
        assert!(matches!(
            try_parse_slug("meters-to-kilograms-converter"),
            Err(ConversionError::IncompatibleKinds { .. })
        ));
    }

    #[test]
    fn test_slug_failures() {
        assert!(matches!(try_parse_slug("meters-feet"), Err(ConversionError::MalformedSlug(_))));
        assert!(matches!(try_parse_slug("furlongs-to-feet"), Err(ConversionError::UnknownUnit(u)) if u == "furlongs"));
        assert!(parse_conversion_from_slug("-to-feet").is_none());
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("1,500"), "1500");
        assert_eq!(sanitize_input("2.5k"), "2500");
        assert_eq!(sanitize_input("3M"), "3000000");
        assert_eq!(sanitize_input("1 b"), "1000000000");
        assert_eq!(sanitize_input("abc"), "abc");
        assert_eq!(sanitize_input(""), "");
    }
}
