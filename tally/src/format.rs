//! Result rendering

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use tally_core::{format_fixed, format_grouped, format_usd, UNAVAILABLE};
use tally_std::functions::js_round;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z_][a-zA-Z0-9_]*").expect("identifier pattern is valid"));

/// Display format tag of an output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Currency,
    Percent,
    Decimal,
    Integer,
    #[default]
    Default,
}

impl OutputFormat {
    /// Unknown or missing tags render like an untagged output
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("currency") => OutputFormat::Currency,
            Some("percent") => OutputFormat::Percent,
            Some("decimal") => OutputFormat::Decimal,
            Some("integer") => OutputFormat::Integer,
            _ => OutputFormat::Default,
        }
    }
}

/// A computed output ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputValue {
    pub id: String,
    pub label: String,
    /// Finite number or `NaN`
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub format: OutputFormat,
    pub formatted: String,
}

impl OutputValue {
    pub fn new(id: &str, label: &str, value: f64, unit: Option<&str>, format: Option<&str>) -> Self {
        let format = OutputFormat::from_tag(format);
        Self {
            id: id.to_string(),
            label: label.to_string(),
            value,
            unit: unit.map(str::to_string),
            format,
            formatted: format_output_value(value, format, unit),
        }
    }
}

/// Render a computed output. Non-finite values show as `—`; only the
/// default format appends the unit.
pub fn format_output_value(value: f64, format: OutputFormat, unit: Option<&str>) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }

    match format {
        OutputFormat::Currency => format_usd(value),
        OutputFormat::Percent => format!("{}%", format_fixed(value * 100.0, 2)),
        OutputFormat::Decimal => format_grouped(value, 4),
        OutputFormat::Integer => format_grouped(js_round(value), 0),
        OutputFormat::Default => {
            let formatted = format_grouped(value, 4);
            match unit {
                Some(unit) if !unit.is_empty() => format!("{} {}", formatted, unit),
                _ => formatted,
            }
        }
    }
}

/// Audit view of an expression: identifiers with a finite value are
/// replaced by that value, everything else is left as written.
pub fn format_expression_with_values(expression: &str, values: &HashMap<String, f64>) -> String {
    IDENTIFIER
        .replace_all(expression, |caps: &regex::Captures| {
            let token = &caps[0];
            match values.get(token) {
                Some(v) if v.is_finite() => format_grouped(*v, 6),
                _ => token.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_with_unit() {
        assert_eq!(format_output_value(1234.56789, OutputFormat::Default, Some("kg")), "1,234.5679 kg");
        assert_eq!(format_output_value(0.5, OutputFormat::Default, None), "0.5");
    }

    #[test]
    fn test_tagged_formats() {
        assert_eq!(format_output_value(1234.5, OutputFormat::Currency, Some("USD")), "$1,234.50");
        assert_eq!(format_output_value(0.0525, OutputFormat::Percent, None), "5.25%");
        assert_eq!(format_output_value(1234.56789, OutputFormat::Decimal, Some("kg")), "1,234.5679");
        assert_eq!(format_output_value(1234.5, OutputFormat::Integer, None), "1,235");
        assert_eq!(format_output_value(-2.5, OutputFormat::Integer, None), "-2");
    }

    #[test]
    fn test_unavailable() {
        assert_eq!(format_output_value(f64::NAN, OutputFormat::Currency, None), "—");
        assert_eq!(format_output_value(f64::INFINITY, OutputFormat::Default, Some("m")), "—");
    }

    #[test]
    fn test_output_value_renders() {
        let out = OutputValue::new("bmi", "BMI", 24.691358, Some("kg/m²"), None);
        assert_eq!(out.formatted, "24.6914 kg/m²");
        let out = OutputValue::new("rate", "Rate", 0.07, Some("%"), Some("percent"));
        assert_eq!(out.format, OutputFormat::Percent);
        assert_eq!(out.formatted, "7.00%");
    }

    #[test]
    fn test_unknown_tag_is_default() {
        assert_eq!(OutputFormat::from_tag(Some("scientific")), OutputFormat::Default);
        assert_eq!(OutputFormat::from_tag(None), OutputFormat::Default);
        assert_eq!(OutputFormat::from_tag(Some("percent")), OutputFormat::Percent);
    }

    #[test]
    fn test_expression_with_values() {
        let values: HashMap<String, f64> =
            [("principal".to_string(), 250000.0), ("rate".to_string(), 0.0425), ("bad".to_string(), f64::NAN)]
                .into_iter()
                .collect();
        assert_eq!(
            format_expression_with_values("principal * rate + pow(bad, 2)", &values),
            "250,000 * 0.0425 + pow(bad, 2)"
        );
    }
}
