//! Top-level validation and the shared field helpers

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::types::CalculatorConfig;

pub(crate) type Object = Map<String, JsonValue>;

const ALLOWED_TOP_LEVEL_KEYS: [&str; 10] = [
    "version",
    "metadata",
    "form",
    "logic",
    "calculator_logic",
    "pageContent",
    "page_content",
    "schema",
    "links",
    "seo_links",
];

/// Outcome of validating one raw document.
///
/// `config` is present only when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub config: Option<CalculatorConfig>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn failed(error: String) -> Self {
        ValidationResult { config: None, errors: vec![error] }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.config.is_some()
    }
}

/// Validate a raw JSON document. Every problem found is reported; nothing panics.
///
/// `context` (usually the calculator slug) prefixes every message.
pub fn validate_calculator_config(raw: &str, context: &str) -> ValidationResult {
    if raw.trim().is_empty() {
        return ValidationResult::failed(format!("{}: config_json cannot be empty", context));
    }

    let parsed: JsonValue = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            return ValidationResult::failed(format!("{}: config_json is not valid JSON ({})", context, e));
        }
    };

    let Some(root) = parsed.as_object() else {
        return ValidationResult::failed(format!("{}: config_json must be a JSON object", context));
    };

    let mut v = Validator::new(context);

    let unsupported: Vec<String> = root
        .keys()
        .filter(|k| !ALLOWED_TOP_LEVEL_KEYS.contains(&k.as_str()))
        .map(|k| format!("\"{}\"", k))
        .collect();
    if !unsupported.is_empty() {
        v.error(format!("unsupported top-level keys: {}", unsupported.join(", ")));
    }

    let version = v.parse_version(root.get("version"));
    let metadata = v.parse_metadata(root.get("metadata"));
    let logic = v.parse_logic(first_present(root, "logic", "calculator_logic"));
    let form = v.parse_form(root.get("form"));
    let page_content = v.parse_page_content(first_present(root, "pageContent", "page_content"));
    let schema = v.parse_schema(root.get("schema"));
    let links = v.parse_links(first_present(root, "links", "seo_links"));

    let errors = v.finish();
    if !errors.is_empty() {
        return ValidationResult { config: None, errors };
    }

    ValidationResult {
        config: Some(CalculatorConfig { version, metadata, form, logic, page_content, schema, links }),
        errors,
    }
}

/// Like [`validate_calculator_config`] but all errors folded into one message
pub fn parse_calculator_config(raw: &str, context: &str) -> Result<CalculatorConfig, String> {
    let result = validate_calculator_config(raw, context);
    match result.config {
        Some(config) if result.errors.is_empty() => Ok(config),
        _ => Err(format_validation_errors(&result.errors)),
    }
}

pub fn format_validation_errors(errors: &[String]) -> String {
    errors.join("; ")
}

/// `a ?? b`: the first key whose value is present and not null
fn first_present<'a>(root: &'a Object, primary: &str, alias: &str) -> Option<&'a JsonValue> {
    root.get(primary)
        .filter(|v| !v.is_null())
        .or_else(|| root.get(alias))
}

/// Error accumulator for one document
pub(crate) struct Validator<'a> {
    context: &'a str,
    errors: Vec<String>,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(context: &'a str) -> Self {
        Validator { context, errors: Vec::new() }
    }

    pub(crate) fn error(&mut self, message: impl AsRef<str>) {
        self.errors.push(format!("{}: {}", self.context, message.as_ref()));
    }

    pub(crate) fn finish(self) -> Vec<String> {
        if !self.errors.is_empty() {
            debug!(context = self.context, errors = self.errors.len(), "config rejected");
        }
        self.errors
    }

    /// Angle brackets are rejected in any displayed text
    pub(crate) fn guard_html(&mut self, value: &str, path: &str) {
        if value.contains('<') || value.contains('>') {
            self.error(format!("{} must not include HTML tags. Use plain text or Markdown.", path));
        }
    }

    /// Wraps a lone value, checks every entry is a string, drops blank ones
    pub(crate) fn coerce_string_array(&mut self, candidate: Option<&JsonValue>, path: &str) -> Option<Vec<String>> {
        let candidate = candidate.filter(|c| !c.is_null())?;
        let values = match candidate {
            JsonValue::Array(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };

        let mut result = Vec::new();
        for (i, value) in values.iter().enumerate() {
            let Some(s) = value.as_str() else {
                self.error(format!("{}[{}] must be a string", path, i));
                continue;
            };
            self.guard_html(s, &format!("{}[{}]", path, i));
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                result.push(trimmed.to_string());
            }
        }

        (!result.is_empty()).then_some(result)
    }

    fn parse_version(&mut self, version: Option<&JsonValue>) -> Option<String> {
        match version {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(s.trim().to_string()),
            Some(JsonValue::Number(n)) => Some(match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => i.to_string(),
                (_, Some(u)) => u.to_string(),
                _ => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
            }),
            Some(_) => {
                self.error("version must be a string or number");
                None
            }
        }
    }

    fn parse_metadata(&mut self, metadata: Option<&JsonValue>) -> Option<crate::MetadataConfig> {
        let metadata = metadata.filter(|m| !m.is_null())?;
        let Some(obj) = metadata.as_object() else {
            self.error("metadata must be an object");
            return None;
        };

        let mut result = crate::MetadataConfig::default();
        for (key, slot) in [("title", &mut result.title), ("description", &mut result.description)] {
            match obj.get(key) {
                None => {}
                Some(JsonValue::String(s)) => {
                    self.guard_html(s, &format!("metadata.{}", key));
                    *slot = Some(s.trim().to_string());
                }
                Some(_) => self.error(format!("metadata.{} must be a string", key)),
            }
        }
        Some(result)
    }
}

/// Non-blank string property, trimmed. Blanks and non-strings read as absent.
pub(crate) fn get_string(obj: &Object, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// JavaScript truthiness
pub(crate) fn is_truthy(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(JsonValue::String(s)) => !s.is_empty(),
        Some(JsonValue::Array(_)) | Some(JsonValue::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogicConfig;

    const CTX: &str = "mortgage";

    fn validate(raw: &str) -> ValidationResult {
        validate_calculator_config(raw, CTX)
    }

    #[test]
    fn test_empty_and_malformed_documents() {
        assert_eq!(validate("  ").errors, vec!["mortgage: config_json cannot be empty"]);

        let result = validate("{nope");
        assert!(result.config.is_none());
        assert!(result.errors[0].starts_with("mortgage: config_json is not valid JSON ("));

        assert_eq!(validate("[1, 2]").errors, vec!["mortgage: config_json must be a JSON object"]);
    }

    #[test]
    fn test_minimal_config() {
        let result = validate(r#"{"version": 2, "metadata": {"title": "  Loan  "}}"#);
        assert!(result.is_valid());
        let config = result.config.unwrap();
        assert_eq!(config.version.as_deref(), Some("2"));
        assert_eq!(config.metadata.unwrap().title.as_deref(), Some("Loan"));
        assert!(config.logic.is_none());
    }

    #[test]
    fn test_version_forms() {
        let config = validate(r#"{"version": 1.5}"#).config.unwrap();
        assert_eq!(config.version.as_deref(), Some("1.5"));
        let config = validate(r#"{"version": " v3 "}"#).config.unwrap();
        assert_eq!(config.version.as_deref(), Some("v3"));
        assert_eq!(
            validate(r#"{"version": true}"#).errors,
            vec!["mortgage: version must be a string or number"]
        );
    }

    #[test]
    fn test_unsupported_top_level_keys() {
        let result = validate(r#"{"component_type": "x", "extra": 1, "version": "1"}"#);
        assert_eq!(
            result.errors,
            vec![r#"mortgage: unsupported top-level keys: "component_type", "extra""#]
        );
        assert!(result.config.is_none());
    }

    #[test]
    fn test_metadata_html_guard() {
        let result = validate(r#"{"metadata": {"title": "<b>Loan</b>", "description": 5}}"#);
        assert_eq!(
            result.errors,
            vec![
                "mortgage: metadata.title must not include HTML tags. Use plain text or Markdown.",
                "mortgage: metadata.description must be a string",
            ]
        );
    }

    #[test]
    fn test_errors_accumulate_across_sections() {
        let raw = r#"{
            "unknown": true,
            "form": {"fields": [{"label": "Amount", "type": "number"}]},
            "page_content": {"faqs": [{"question": "Why?", "answer": "Because <script>"}]}
        }"#;
        let result = validate(raw);
        assert!(result.config.is_none());
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.errors[0], r#"mortgage: unsupported top-level keys: "unknown""#);
        assert_eq!(result.errors[1], "mortgage: form.fields[0] requires id, label, and type");
        assert_eq!(
            result.errors[2],
            "mortgage: page_content.faqs[0].answer must not include HTML tags. Use plain text or Markdown."
        );
    }

    #[test]
    fn test_aliased_sections() {
        let raw = r#"{
            "logic": null,
            "calculator_logic": {"fromUnitId": "meter", "toUnitId": "foot"},
            "seo_links": {"internal": "/length"}
        }"#;
        let config = validate(raw).config.unwrap();
        assert!(matches!(config.logic, Some(LogicConfig::Conversion(_))));
        assert_eq!(config.links.unwrap().internal, Some(vec!["/length".to_string()]));
    }

    #[test]
    fn test_parse_calculator_config_joins_errors() {
        let err = parse_calculator_config(r#"{"a": 1, "version": []}"#, CTX).unwrap_err();
        assert_eq!(
            err,
            r#"mortgage: unsupported top-level keys: "a"; mortgage: version must be a string or number"#
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(Some(&serde_json::json!("yes"))));
        assert!(is_truthy(Some(&serde_json::json!(1))));
        assert!(!is_truthy(Some(&serde_json::json!(0))));
        assert!(!is_truthy(Some(&serde_json::json!(""))));
        assert!(!is_truthy(None));
    }
}
