//! `logic` section: conversion, formula, advanced or generic

use serde_json::Value as JsonValue;

use crate::types::*;
use crate::validate::{get_string, Object, Validator};

impl Validator<'_> {
    pub(crate) fn parse_logic(&mut self, candidate: Option<&JsonValue>) -> Option<LogicConfig> {
        let candidate = candidate.filter(|c| !c.is_null())?;
        let Some(obj) = candidate.as_object() else {
            self.error("logic must be an object");
            return None;
        };

        let declared = obj
            .get("type")
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        // A bare unit pair is read as a conversion
        let kind = match declared {
            Some(t) => t,
            None if obj.contains_key("fromUnitId") && obj.contains_key("toUnitId") => "conversion".to_string(),
            None => {
                self.error("logic.type is required");
                return None;
            }
        };

        match kind.as_str() {
            "conversion" | "converter" => self.parse_conversion_logic(obj),
            "formula" => self.parse_formula_logic(obj),
            "advanced" => self.parse_advanced_logic(obj),
            _ => Some(LogicConfig::Generic(GenericLogic { kind, data: obj.clone() })),
        }
    }

    fn parse_conversion_logic(&mut self, obj: &Object) -> Option<LogicConfig> {
        match (get_string(obj, "fromUnitId"), get_string(obj, "toUnitId")) {
            (Some(from_unit_id), Some(to_unit_id)) => {
                Some(LogicConfig::Conversion(ConversionLogic { from_unit_id, to_unit_id }))
            }
            _ => {
                self.error("conversion logic requires fromUnitId and toUnitId");
                None
            }
        }
    }

    fn parse_formula_logic(&mut self, obj: &Object) -> Option<LogicConfig> {
        let items = match obj.get("outputs").and_then(JsonValue::as_array) {
            Some(items) if !items.is_empty() => items,
            _ => {
                self.error("formula logic requires an outputs array");
                return None;
            }
        };

        let mut outputs = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let Some(item) = item.as_object() else {
                self.error(format!("formula logic outputs[{}] must be an object", i));
                continue;
            };

            let (Some(id), Some(label), Some(expression)) =
                (get_string(item, "id"), get_string(item, "label"), get_string(item, "expression"))
            else {
                self.error(format!("formula logic outputs[{}] requires id, label, and expression", i));
                continue;
            };

            self.guard_html(&label, &format!("formula logic outputs[{}].label", i));
            outputs.push(FormulaOutput {
                id,
                label,
                expression,
                unit: get_string(item, "unit"),
                format: get_string(item, "format"),
            });
        }

        if outputs.is_empty() {
            self.error("formula logic must define at least one valid output");
            return None;
        }

        Some(LogicConfig::Formula(FormulaLogic { outputs }))
    }

    /// Methods come as an array, or as an object keyed by method id
    fn parse_advanced_logic(&mut self, obj: &Object) -> Option<LogicConfig> {
        let entries: Vec<(String, Option<String>, &JsonValue)> = match obj.get("methods") {
            Some(JsonValue::Array(items)) if !items.is_empty() => items
                .iter()
                .enumerate()
                .map(|(i, m)| (format!("methods[{}]", i), None, m))
                .collect(),
            Some(JsonValue::Object(map)) if !map.is_empty() => map
                .iter()
                .map(|(key, m)| (format!("methods.{}", key), Some(key.clone()), m))
                .collect(),
            _ => {
                self.error("advanced logic requires a methods array or object");
                return None;
            }
        };

        let mut methods = Vec::with_capacity(entries.len());
        for (path, key, method) in entries {
            if let Some(m) = self.parse_advanced_method(&path, key, method) {
                methods.push(m);
            }
        }

        if methods.is_empty() {
            self.error("advanced logic must define at least one valid method");
            return None;
        }

        let requested = get_string(obj, "defaultMethod");
        let default_method = match requested {
            Some(id) if methods.iter().any(|m: &AdvancedMethod| m.id == id) => id,
            _ => methods[0].id.clone(),
        };

        Some(LogicConfig::Advanced(AdvancedLogic { methods, default_method }))
    }

    fn parse_advanced_method(&mut self, path: &str, key: Option<String>, method: &JsonValue) -> Option<AdvancedMethod> {
        let Some(obj) = method.as_object() else {
            self.error(format!("advanced logic {} must be an object", path));
            return None;
        };

        let id = get_string(obj, "id").or(key);
        let (Some(id), Some(label)) = (id, get_string(obj, "label")) else {
            self.error(format!("advanced logic {} requires id and label", path));
            return None;
        };
        self.guard_html(&label, &format!("advanced logic {}.label", path));

        let description = get_string(obj, "description");
        if let Some(d) = &description {
            self.guard_html(d, &format!("advanced logic {}.description", path));
        }

        let variables = self.parse_variables(path, obj.get("variables"));
        let outputs = self.parse_advanced_outputs(path, obj.get("outputs"));

        Some(AdvancedMethod { id, label, description, variables: variables?, outputs: outputs? })
    }

    fn parse_variables(&mut self, path: &str, candidate: Option<&JsonValue>) -> Option<Vec<VariableDef>> {
        let map = match candidate {
            None | Some(JsonValue::Null) => return Some(Vec::new()),
            Some(JsonValue::Object(map)) => map,
            Some(_) => {
                self.error(format!("advanced logic {}.variables must be an object", path));
                return None;
            }
        };

        let mut ok = true;
        let mut variables = Vec::with_capacity(map.len());
        for (id, def) in map {
            let Some(expression) = def.as_object().and_then(|d| get_string(d, "expression")) else {
                self.error(format!("advanced logic {}.variables.{} requires expression", path, id));
                ok = false;
                continue;
            };

            let dependencies = match def.get("dependencies") {
                None | Some(JsonValue::Null) => Vec::new(),
                Some(JsonValue::Array(items)) if items.iter().all(JsonValue::is_string) => items
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .map(|d| d.trim().to_string())
                    .collect(),
                Some(_) => {
                    self.error(format!(
                        "advanced logic {}.variables.{}.dependencies must be an array of strings",
                        path, id
                    ));
                    ok = false;
                    continue;
                }
            };

            variables.push(VariableDef { id: id.clone(), expression, dependencies });
        }

        ok.then_some(variables)
    }

    fn parse_advanced_outputs(&mut self, path: &str, candidate: Option<&JsonValue>) -> Option<Vec<AdvancedOutput>> {
        let items = match candidate.and_then(JsonValue::as_array) {
            Some(items) if !items.is_empty() => items,
            _ => {
                self.error(format!("advanced logic {}.outputs must be a non-empty array", path));
                return None;
            }
        };

        let mut outputs = Vec::with_capacity(items.len());
        for (j, item) in items.iter().enumerate() {
            let Some(item) = item.as_object() else {
                self.error(format!("advanced logic {}.outputs[{}] must be an object", path, j));
                continue;
            };
            let (Some(id), Some(label), Some(variable)) =
                (get_string(item, "id"), get_string(item, "label"), get_string(item, "variable"))
            else {
                self.error(format!("advanced logic {}.outputs[{}] requires id, label, and variable", path, j));
                continue;
            };
            self.guard_html(&label, &format!("advanced logic {}.outputs[{}].label", path, j));
            outputs.push(AdvancedOutput {
                id,
                label,
                variable,
                unit: get_string(item, "unit"),
                format: get_string(item, "format"),
            });
        }

        Some(outputs)
    }
}
