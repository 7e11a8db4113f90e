//! `form` section: input fields and the optional result block

use serde_json::Value as JsonValue;

use crate::types::{FieldOption, FormConfig, FormField, FormResultConfig, OutputSpec};
use crate::validate::{get_string, is_truthy, Object, Validator};

impl Validator<'_> {
    pub(crate) fn parse_form(&mut self, candidate: Option<&JsonValue>) -> Option<FormConfig> {
        let candidate = candidate.filter(|c| !c.is_null())?;
        let Some(form) = candidate.as_object() else {
            self.error("form must be an object");
            return None;
        };

        let items = match form.get("fields").and_then(JsonValue::as_array) {
            Some(items) if !items.is_empty() => items,
            _ => {
                self.error("form.fields must be a non-empty array");
                return None;
            }
        };

        let fields = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.parse_field(i, item))
            .collect();

        let result = self.parse_form_result(form.get("result"));
        Some(FormConfig { fields, result })
    }

    fn parse_field(&mut self, i: usize, item: &JsonValue) -> Option<FormField> {
        let Some(item) = item.as_object() else {
            self.error(format!("form.fields[{}] must be an object", i));
            return None;
        };

        let (Some(id), Some(label), Some(field_type)) =
            (get_string(item, "id"), get_string(item, "label"), get_string(item, "type"))
        else {
            self.error(format!("form.fields[{}] requires id, label, and type", i));
            return None;
        };
        self.guard_html(&label, &format!("form.fields[{}].label", i));

        let mut field = FormField {
            id,
            label,
            field_type,
            required: is_truthy(item.get("required")),
            placeholder: None,
            min: None,
            max: None,
            step: None,
            options: None,
        };

        if item.contains_key("placeholder") {
            match get_string(item, "placeholder") {
                Some(p) => {
                    self.guard_html(&p, &format!("form.fields[{}].placeholder", i));
                    field.placeholder = Some(p);
                }
                None => self.error(format!("form.fields[{}].placeholder must be a string", i)),
            }
        }

        field.min = self.numeric_property(item, i, "min");
        field.max = self.numeric_property(item, i, "max");
        field.step = self.numeric_property(item, i, "step");

        if let Some(options) = item.get("options") {
            field.options = self.parse_options(i, options);
        }

        Some(field)
    }

    fn numeric_property(&mut self, item: &Object, i: usize, key: &str) -> Option<f64> {
        let value = item.get(key)?;
        let n = value.as_f64();
        if n.is_none() {
            self.error(format!("form.fields[{}].{} must be a number", i, key));
        }
        n
    }

    fn parse_options(&mut self, i: usize, options: &JsonValue) -> Option<Vec<FieldOption>> {
        let Some(options) = options.as_array() else {
            self.error(format!("form.fields[{}].options must be an array", i));
            return None;
        };

        let mut parsed = Vec::with_capacity(options.len());
        for (j, option) in options.iter().enumerate() {
            let Some(option) = option.as_object() else {
                self.error(format!("form.fields[{}].options[{}] must be an object", i, j));
                continue;
            };
            let (Some(label), Some(value)) = (get_string(option, "label"), get_string(option, "value")) else {
                self.error(format!("form.fields[{}].options[{}] requires label and value", i, j));
                continue;
            };
            self.guard_html(&label, &format!("form.fields[{}].options[{}].label", i, j));
            parsed.push(FieldOption { label, value });
        }
        Some(parsed)
    }

    fn parse_form_result(&mut self, candidate: Option<&JsonValue>) -> Option<FormResultConfig> {
        let candidate = candidate.filter(|c| !c.is_null())?;
        let Some(result) = candidate.as_object() else {
            self.error("form.result must be an object");
            return None;
        };
        let Some(items) = result.get("outputs").and_then(JsonValue::as_array) else {
            self.error("form.result.outputs must be an array");
            return None;
        };

        let mut outputs = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let Some(item) = item.as_object() else {
                self.error(format!("form.result.outputs[{}] must be an object", i));
                continue;
            };
            let (Some(id), Some(label)) = (get_string(item, "id"), get_string(item, "label")) else {
                self.error(format!("form.result.outputs[{}] requires id and label", i));
                continue;
            };
            self.guard_html(&label, &format!("form.result.outputs[{}].label", i));
            outputs.push(OutputSpec {
                id,
                label,
                unit: get_string(item, "unit"),
                format: get_string(item, "format"),
            });
        }

        Some(FormResultConfig { outputs })
    }
}

#[cfg(test)]
mod tests {
    use crate::validate_calculator_config;

    fn errors(raw: &str) -> Vec<String> {
        validate_calculator_config(raw, "bmi").errors
    }

    #[test]
    fn test_valid_form() {
        let raw = r#"{"form": {
            "fields": [
                {"id": "weight", "label": "Weight", "type": "number", "required": 1, "min": 0, "step": 0.1},
                {"id": "sex", "label": "Sex", "type": "select", "options": [{"label": "Female", "value": "f"}]}
            ],
            "result": {"outputs": [{"id": "bmi", "label": "BMI", "format": "decimal"}]}
        }}"#;
        let config = validate_calculator_config(raw, "bmi").config.unwrap();
        let form = config.form.unwrap();
        assert_eq!(form.fields.len(), 2);
        assert!(form.fields[0].required);
        assert_eq!(form.fields[0].min, Some(0.0));
        assert_eq!(form.fields[0].step, Some(0.1));
        assert!(!form.fields[1].required);
        assert_eq!(form.fields[1].options.as_ref().unwrap()[0].value, "f");
        assert_eq!(form.result.unwrap().outputs[0].format.as_deref(), Some("decimal"));
    }

    #[test]
    fn test_fields_must_be_non_empty() {
        assert_eq!(errors(r#"{"form": {"fields": []}}"#), vec!["bmi: form.fields must be a non-empty array"]);
        assert_eq!(errors(r#"{"form": []}"#), vec!["bmi: form must be an object"]);
    }

    #[test]
    fn test_field_type_errors() {
        let raw = r#"{"form": {"fields": [
            {"id": "a", "label": "A", "type": "number", "min": "0", "max": 10, "placeholder": 3},
            {"id": "b", "label": "B", "type": "select", "options": [{"label": "<i>x</i>", "value": "x"}, {"label": "y"}]},
            7
        ]}}"#;
        assert_eq!(
            errors(raw),
            vec![
                "bmi: form.fields[0].placeholder must be a string",
                "bmi: form.fields[0].min must be a number",
                "bmi: form.fields[1].options[0].label must not include HTML tags. Use plain text or Markdown.",
                "bmi: form.fields[1].options[1] requires label and value",
                "bmi: form.fields[2] must be an object",
            ]
        );
    }

    #[test]
    fn test_result_errors() {
        let raw = r#"{"form": {"fields": [{"id": "a", "label": "A", "type": "number"}], "result": {"outputs": [{"id": "x"}]}}}"#;
        assert_eq!(errors(raw), vec!["bmi: form.result.outputs[0] requires id and label"]);
        let raw = r#"{"form": {"fields": [{"id": "a", "label": "A", "type": "number"}], "result": {}}}"#;
        assert_eq!(errors(raw), vec!["bmi: form.result.outputs must be an array"]);
    }
}
