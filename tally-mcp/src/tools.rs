//! Tool catalogue and handlers

use crate::resources::load_config_file;
use crate::{McpError, Server};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use tally::{
    format_expression_with_values, format_output_value, get_output_expression, Calculation, OutputFormat,
};
use tally_config::{parse_calculator_config, validate_calculator_config, LogicConfig};
use tally_core::{parse_float_prefix, parse_number, TallyError, Value};
use tally_units::{
    build_conversion_table, derive_linear_coefficients, format_formula, format_unit_value, formula_explanation,
    parse_conversion_from_slug, resolve_unit, reverse_formula_explanation, sanitize_input, seeds_for,
    ConversionContext, Direction, UnitKind, UNITS,
};
use tracing::debug;

pub fn tools_list() -> JsonValue {
    let pair = json!({
        "from": { "type": "string", "description": "Unit id, name or symbol, e.g. 'km', 'Square Feet'" },
        "to": { "type": "string", "description": "Unit id, name or symbol" },
        "direction": { "type": "string", "enum": ["forward", "reverse"], "default": "forward" }
    });

    json!({
        "tools": [
            {
                "name": "validate_config",
                "description": "Validate a calculator config document. Reports every defect at once.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "config": {
                            "description": "Config as a JSON string or object"
                        },
                        "context": {
                            "type": "string",
                            "description": "Prefix for error messages (default: config)"
                        }
                    },
                    "required": ["config"]
                }
            },
            {
                "name": "evaluate",
                "description": "Evaluate an expression. Helpers: pow, min, max, abs, sqrt, log, exp; Math.* functions and constants.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "expression": { "type": "string" },
                        "inputs": {
                            "type": "object",
                            "description": "Identifier values (numbers or numeric strings)"
                        },
                        "format": {
                            "type": "string",
                            "enum": ["currency", "percent", "decimal", "integer"]
                        },
                        "unit": { "type": "string" }
                    },
                    "required": ["expression"]
                }
            },
            {
                "name": "evaluate_file",
                "description": "Validate and calculate a config file from the data directory.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "File name without .json extension"
                        },
                        "inputs": {
                            "type": "object",
                            "description": "Form field values; conversions read 'value'"
                        },
                        "method": {
                            "type": "string",
                            "description": "Advanced calculators: method id (default: the config's default)"
                        }
                    },
                    "required": ["name"]
                }
            },
            {
                "name": "convert",
                "description": "Convert a value between two units of the same kind.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "value": { "description": "Number, or text such as '1,500' or '2.5k'" },
                        "from": pair["from"],
                        "to": pair["to"],
                        "direction": pair["direction"]
                    },
                    "required": ["value", "from", "to"]
                }
            },
            {
                "name": "resolve_unit",
                "description": "Resolve a unit token, or a conversion slug such as 'meters-to-feet-converter'.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "token": { "type": "string" },
                        "slug": { "type": "string" }
                    }
                }
            },
            {
                "name": "conversion_table",
                "description": "Reference table of common values for a unit pair.",
                "inputSchema": {
                    "type": "object",
                    "properties": pair,
                    "required": ["from", "to"]
                }
            },
            {
                "name": "conversion_formula",
                "description": "Linear formula and explanations for a unit pair.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "from": pair["from"],
                        "to": pair["to"]
                    },
                    "required": ["from", "to"]
                }
            },
            {
                "name": "list_units",
                "description": "List registered units, optionally of one kind.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "kind": {
                            "type": "string",
                            "enum": UnitKind::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>()
                        }
                    }
                }
            },
            {
                "name": "list_functions",
                "description": "List functions expressions may call, and Math constants.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Filter: helper, math",
                            "enum": ["helper", "math"]
                        }
                    }
                }
            },
            {
                "name": "fx_rate",
                "description": "ECB reference exchange rate for a currency pair.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "base": { "type": "string", "default": "USD" },
                        "quote": { "type": "string", "default": "EUR" },
                        "date": { "type": "string", "description": "YYYY-MM-DD (default: latest)" }
                    }
                }
            }
        ]
    })
}

pub(crate) fn call_tool(server: &mut Server, name: &str, args: &JsonValue) -> Result<JsonValue, McpError> {
    debug!(tool = name, "tool call");
    match name {
        "validate_config" => tool_validate_config(args),
        "evaluate" => tool_evaluate(server, args),
        "evaluate_file" => tool_evaluate_file(server, args),
        "convert" => tool_convert(server, args),
        "resolve_unit" => tool_resolve_unit(args),
        "conversion_table" => tool_conversion_table(args),
        "conversion_formula" => tool_conversion_formula(args),
        "list_units" => tool_list_units(args),
        "list_functions" => tool_list_functions(server, args),
        "fx_rate" => tool_fx_rate(server, args),
        _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
    }
}

/// Tool result with a text block and extra structured fields
fn tool_result(text: impl Into<String>, is_error: bool, data: JsonValue) -> JsonValue {
    let mut result = json!({
        "content": [{ "type": "text", "text": text.into() }],
        "isError": is_error
    });
    if let (Some(out), JsonValue::Object(extra)) = (result.as_object_mut(), data) {
        out.extend(extra);
    }
    result
}

fn to_json<T: Serialize>(value: &T) -> JsonValue {
    serde_json::to_value(value).unwrap_or(JsonValue::Null)
}

fn str_arg<'a>(args: &'a JsonValue, key: &str) -> Result<&'a str, McpError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params(format!("Missing {} argument", key)))
}

fn opt_str<'a>(args: &'a JsonValue, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

/// Numbers pass through; strings keep their leading number; anything else
/// is left out
fn json_inputs(args: &JsonValue) -> HashMap<String, f64> {
    args.get("inputs")
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| {
                    let n = match v {
                        JsonValue::Number(n) => n.as_f64(),
                        JsonValue::String(s) => parse_float_prefix(s),
                        _ => None,
                    }?;
                    Some((k.clone(), n))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn direction_arg(args: &JsonValue) -> Result<Direction, McpError> {
    match opt_str(args, "direction") {
        None => Ok(Direction::Forward),
        Some(tag) => Direction::from_tag(tag)
            .ok_or_else(|| McpError::invalid_params(format!("Invalid direction '{}': use forward or reverse", tag))),
    }
}

/// Bind two unit tokens through the alias table
fn unit_pair(args: &JsonValue) -> Result<ConversionContext, McpError> {
    let from_token = str_arg(args, "from")?;
    let to_token = str_arg(args, "to")?;
    let unknown = |token: &str| {
        McpError::invalid_params(format!("Unknown unit: {}", token)).with_data(json!({ "token": token }))
    };
    let from = resolve_unit(from_token).ok_or_else(|| unknown(from_token))?;
    let to = resolve_unit(to_token).ok_or_else(|| unknown(to_token))?;
    ConversionContext::new(from, to).map_err(|e| McpError::invalid_params(e.to_string()))
}

fn tool_validate_config(args: &JsonValue) -> Result<JsonValue, McpError> {
    let raw = match args.get("config") {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => return Err(McpError::invalid_params("Missing config argument")),
    };
    let context = opt_str(args, "context").unwrap_or("config");

    let result = validate_calculator_config(&raw, context);
    let text = match &result.config {
        Some(config) => format!(
            "Config is valid (logic: {})",
            config.logic.as_ref().map(LogicConfig::type_name).unwrap_or("none")
        ),
        None => format!("{} error(s):\n- {}", result.errors.len(), result.errors.join("\n- ")),
    };

    Ok(tool_result(
        text,
        !result.is_valid(),
        json!({
            "valid": result.is_valid(),
            "errors": result.errors,
            "config": to_json(&result.config)
        }),
    ))
}

fn tool_evaluate(server: &Server, args: &JsonValue) -> Result<JsonValue, McpError> {
    let expression = str_arg(args, "expression")?;
    let inputs = json_inputs(args);

    let result = server.tally.eval(expression, &inputs);
    let value = result.to_finite();
    let format = OutputFormat::from_tag(opt_str(args, "format"));
    let formatted = format_output_value(value, format, opt_str(args, "unit"));

    let error = match &result {
        Value::Number(n) if !n.is_finite() => Some(TallyError::non_finite(*n)),
        Value::Bool(_) => Some(TallyError::type_error("Number", "Bool")),
        Value::Error(e) => Some(e.clone()),
        Value::Number(_) => None,
    };
    let text = match &error {
        Some(e) => format!("{} = {}\n\n{}", expression, formatted, e),
        None => format!("{} = {}", expression, formatted),
    };

    Ok(tool_result(
        text,
        error.is_some(),
        json!({
            "value": result.to_json(),
            "formatted": formatted,
            "error": to_json(&error)
        }),
    ))
}

fn tool_evaluate_file(server: &Server, args: &JsonValue) -> Result<JsonValue, McpError> {
    let name = str_arg(args, "name")?;
    let raw = load_config_file(&server.settings.data_path, name).map_err(McpError::invalid_params)?;

    let config = match parse_calculator_config(&raw, name) {
        Ok(config) => config,
        Err(errors) => return Ok(tool_result(errors, true, json!({ "source_file": format!("{}.json", name) }))),
    };

    let inputs = json_inputs(args);
    let calculation = match server.tally.calculate(&config, &inputs, opt_str(args, "method")) {
        Ok(c) => c,
        Err(e) => return Ok(tool_result(format!("{}: {}", name, e), true, json!({}))),
    };

    let mut lines: Vec<String> = calculation
        .outputs()
        .iter()
        .map(|o| format!("- {}: {}", o.label, o.formatted))
        .collect();
    let audit = audit_lines(&config.logic, &calculation, &inputs);
    if !audit.is_empty() {
        lines.push(String::new());
        lines.push("How this is calculated:".to_string());
        lines.extend(audit);
    }

    let title = config.metadata.as_ref().and_then(|m| m.title.clone()).unwrap_or_else(|| name.to_string());
    Ok(tool_result(
        format!("# {}\n\n{}", title, lines.join("\n")),
        false,
        json!({
            "source_file": format!("{}.json", name),
            "result": to_json(&calculation)
        }),
    ))
}

/// Each output's expression with known values substituted
fn audit_lines(logic: &Option<LogicConfig>, calculation: &Calculation, inputs: &HashMap<String, f64>) -> Vec<String> {
    match (logic, calculation) {
        (Some(LogicConfig::Formula(formula)), Calculation::Formula(_)) => formula
            .outputs
            .iter()
            .map(|o| format!("- {}: {}", o.label, format_expression_with_values(&o.expression, inputs)))
            .collect(),
        (Some(LogicConfig::Advanced(advanced)), Calculation::Advanced(evaluation)) => {
            let Some(method) = advanced.method(Some(evaluation.method.as_str())) else {
                return Vec::new();
            };
            let mut values = inputs.clone();
            values.extend(evaluation.values());
            method
                .outputs
                .iter()
                .filter_map(|o| {
                    let expression = get_output_expression(method, &o.id);
                    (!expression.is_empty())
                        .then(|| format!("- {}: {}", o.label, format_expression_with_values(expression, &values)))
                })
                .collect()
        }
        (_, Calculation::Conversion(outcome)) => vec![format!("- {}", outcome.formula)],
        _ => Vec::new(),
    }
}

fn tool_convert(server: &Server, args: &JsonValue) -> Result<JsonValue, McpError> {
    let value = match args.get("value") {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(JsonValue::String(s)) => parse_number(&sanitize_input(s)).unwrap_or(f64::NAN),
        _ => return Err(McpError::invalid_params("Missing value argument")),
    };
    let context = unit_pair(args)?;
    let direction = direction_arg(args)?;

    let outcome = server.tally.convert(&context, value, direction);
    let source = match direction {
        Direction::Forward => context.from(),
        Direction::Reverse => context.to(),
    };
    let text = format!(
        "{} {} = {} {}",
        format_unit_value(value, source),
        source.symbol,
        outcome.output.formatted,
        outcome.output.unit.as_deref().unwrap_or("")
    );

    Ok(tool_result(text.trim_end(), !outcome.output.value.is_finite(), to_json(&outcome)))
}

fn tool_resolve_unit(args: &JsonValue) -> Result<JsonValue, McpError> {
    if let Some(slug) = opt_str(args, "slug") {
        let context = parse_conversion_from_slug(slug);
        let text = match &context {
            Some(c) => format!("{} → {} ({})", c.from().label, c.to().label, c.kind()),
            None => format!("No conversion matches '{}'", slug),
        };
        return Ok(tool_result(text, context.is_none(), json!({ "context": to_json(&context) })));
    }

    let token = str_arg(args, "token")?;
    let unit = resolve_unit(token);
    let text = match unit {
        Some(u) => format!("{} ({}, {}): id '{}'", u.label, u.symbol, u.kind, u.id),
        None => format!("Unknown unit: {}", token),
    };
    Ok(tool_result(text, unit.is_none(), json!({ "unit": to_json(&unit) })))
}

fn tool_conversion_table(args: &JsonValue) -> Result<JsonValue, McpError> {
    let context = unit_pair(args)?;
    let direction = direction_arg(args)?;
    let rows = build_conversion_table(seeds_for(direction), &context, direction);

    let (source, target) = match direction {
        Direction::Forward => (context.from(), context.to()),
        Direction::Reverse => (context.to(), context.from()),
    };
    let mut text = format!("| {} | {} |\n|---|---|\n", source.label, target.label);
    for row in &rows {
        text.push_str(&format!(
            "| {} | {} |\n",
            format_unit_value(row.input, source),
            format_unit_value(row.output, target)
        ));
    }

    Ok(tool_result(text, false, json!({ "rows": to_json(&rows) })))
}

fn tool_conversion_formula(args: &JsonValue) -> Result<JsonValue, McpError> {
    let context = unit_pair(args)?;
    let formula = format_formula(&context);
    let explanation = formula_explanation(&context);
    let reverse = reverse_formula_explanation(&context);

    Ok(tool_result(
        format!("{}\n\n{}\n\n{}", formula, explanation, reverse),
        false,
        json!({
            "formula": formula,
            "coefficients": to_json(&derive_linear_coefficients(&context)),
            "explanation": explanation,
            "reverseExplanation": reverse
        }),
    ))
}

fn tool_list_units(args: &JsonValue) -> Result<JsonValue, McpError> {
    let units = match opt_str(args, "kind") {
        Some(tag) => {
            let kind = UnitKind::from_tag(tag)
                .ok_or_else(|| McpError::invalid_params(format!("Unknown kind: {}", tag)))?;
            UNITS.by_kind(kind)
        }
        None => UNITS.units().iter().collect(),
    };

    let text = units
        .iter()
        .map(|u| format!("- {} ({}): {}", u.id, u.symbol, u.label))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(tool_result(text, false, json!({ "units": to_json(&units) })))
}

fn tool_list_functions(server: &Server, args: &JsonValue) -> Result<JsonValue, McpError> {
    let functions = server.tally.list_functions(opt_str(args, "category"));
    let constants = server.tally.list_constants();

    let mut text: Vec<String> = functions.iter().map(|f| format!("- {}: {}", f.usage, f.description)).collect();
    text.extend(constants.iter().map(|c| format!("- Math.{}: {}", c.name, c.description)));

    Ok(tool_result(
        text.join("\n"),
        false,
        json!({
            "functions": to_json(&functions),
            "constants": to_json(&constants)
        }),
    ))
}

fn tool_fx_rate(server: &mut Server, args: &JsonValue) -> Result<JsonValue, McpError> {
    let base = opt_str(args, "base").unwrap_or("USD");
    let quote = opt_str(args, "quote").unwrap_or("EUR");
    let date = opt_str(args, "date");

    match server.rates.quote(server.rate_source.as_ref(), base, quote, date) {
        Ok(q) => Ok(tool_result(
            format!("1 {} = {} {} ({}, {})", q.base, q.rate, q.quote, q.source, q.date_used),
            false,
            to_json(&q),
        )),
        Err(e) => Ok(tool_result(format!("Rate unavailable: {}", e), true, json!({}))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::tests::scratch_dir;
    use crate::tests::test_server;
    use std::fs;

    fn run(server: &mut Server, tool: &str, args: JsonValue) -> JsonValue {
        call_tool(server, tool, &args).unwrap()
    }

    fn text(result: &JsonValue) -> &str {
        result["content"][0]["text"].as_str().unwrap()
    }

    #[test]
    fn test_every_listed_tool_is_callable() {
        let mut server = test_server(scratch_dir("tools-listed"));
        let tools = tools_list();
        for tool in tools["tools"].as_array().unwrap() {
            let name = tool["name"].as_str().unwrap();
            // empty arguments: either a result or an invalid-params error, never "unknown tool"
            if let Err(e) = call_tool(&mut server, name, &json!({})) {
                assert!(!e.message.starts_with("Unknown tool"), "{}", name);
            }
        }
        assert!(call_tool(&mut server, "eval", &json!({})).is_err());
    }

    #[test]
    fn test_validate_config_reports_all_errors() {
        let mut server = test_server(scratch_dir("tools-validate"));
        let config = json!({
            "unknown": true,
            "form": { "fields": [{ "label": "Amount", "type": "number" }] },
            "page_content": { "faqs": [{ "question": "Why?", "answer": "Because <script>" }] }
        });
        let result = run(&mut server, "validate_config", json!({ "config": config, "context": "demo" }));
        assert_eq!(result["valid"], false);
        assert_eq!(result["errors"].as_array().unwrap().len(), 3);
        assert_eq!(result["config"], JsonValue::Null);
        assert_eq!(result["isError"], true);
    }

    #[test]
    fn test_evaluate() {
        let mut server = test_server(scratch_dir("tools-eval"));
        let result = run(
            &mut server,
            "evaluate",
            json!({ "expression": "price * (1 + rate)", "inputs": { "price": 200, "rate": "0.08" }, "format": "currency" }),
        );
        assert_eq!(result["value"], json!(216.0));
        assert_eq!(result["formatted"], "$216.00");

        let failed = run(&mut server, "evaluate", json!({ "expression": "1 / 0" }));
        assert_eq!(failed["value"], JsonValue::Null);
        assert_eq!(failed["formatted"], "—");
        assert_eq!(failed["error"]["code"], "NON_FINITE");
    }

    #[test]
    fn test_evaluate_huge_expression() {
        let mut server = test_server(scratch_dir("tools-eval-huge"));
        let expression = format!("1{}", "+1".repeat(20_000));
        let result = run(&mut server, "evaluate", json!({ "expression": expression }));
        assert_eq!(result["value"], JsonValue::Null);
        assert_eq!(result["isError"], true);
        assert_eq!(result["error"]["code"], "PARSE_ERROR");
    }

    #[test]
    fn test_evaluate_file() {
        let dir = scratch_dir("tools-file");
        fs::write(
            dir.join("loan.json"),
            r#"{
                "metadata": {"title": "Loan"},
                "form": {"fields": [{"id": "principal", "label": "Principal", "type": "currency"}]},
                "logic": {"type": "advanced", "methods": {
                    "flat": {"label": "Flat", "variables": {
                        "interest": {"expression": "principal * 0.1"},
                        "total": {"expression": "principal + interest", "dependencies": ["interest"]}
                    }, "outputs": [{"id": "total", "label": "Total", "variable": "total", "format": "currency"}]}
                }}
            }"#,
        )
        .unwrap();
        let mut server = test_server(dir.clone());

        let result = run(&mut server, "evaluate_file", json!({ "name": "loan", "inputs": { "principal": 1000 } }));
        assert_eq!(result["isError"], false);
        assert_eq!(result["result"]["type"], "advanced");
        assert_eq!(result["result"]["outputs"][0]["value"], json!(1100.0));
        let out = text(&result);
        assert!(out.contains("- Total: $1,100.00"));
        assert!(out.contains("- Total: 1,000 + 100"));

        assert!(call_tool(&mut server, "evaluate_file", &json!({ "name": "nope" })).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_convert() {
        let mut server = test_server(scratch_dir("tools-convert"));
        let result = run(&mut server, "convert", json!({ "value": "1,500", "from": "meters", "to": "km" }));
        assert_eq!(result["output"]["value"], json!(1.5));
        assert_eq!(result["kind"], "length");

        let reverse = run(
            &mut server,
            "convert",
            json!({ "value": 212, "from": "celsius", "to": "fahrenheit", "direction": "reverse" }),
        );
        assert!((reverse["output"]["value"].as_f64().unwrap() - 100.0).abs() < 1e-9);

        let err = call_tool(&mut server, "convert", &json!({ "value": 1, "from": "meter", "to": "kilogram" })).unwrap_err();
        assert!(err.message.contains("incompatible kinds"));
    }

    #[test]
    fn test_resolve_unit() {
        let mut server = test_server(scratch_dir("tools-resolve"));
        let unit = run(&mut server, "resolve_unit", json!({ "token": "Square Feet" }));
        assert_eq!(unit["unit"]["id"], "square_foot");

        let slug = run(&mut server, "resolve_unit", json!({ "slug": "meters-to-feet-converter" }));
        assert_eq!(slug["context"]["kind"], "length");
        let mismatch = run(&mut server, "resolve_unit", json!({ "slug": "meters-to-kilograms-converter" }));
        assert_eq!(mismatch["context"], JsonValue::Null);
        assert_eq!(mismatch["isError"], true);
    }

    #[test]
    fn test_conversion_table_and_formula() {
        let mut server = test_server(scratch_dir("tools-table"));
        let table = run(&mut server, "conversion_table", json!({ "from": "km", "to": "m" }));
        assert_eq!(table["rows"].as_array().unwrap().len(), 6);
        assert_eq!(table["rows"][0]["output"], json!(1000.0));

        let formula = run(&mut server, "conversion_formula", json!({ "from": "celsius", "to": "fahrenheit" }));
        assert_eq!(formula["formula"], "°F = (°C × 1.8) + 32");
    }

    #[test]
    fn test_list_units_by_kind() {
        let mut server = test_server(scratch_dir("tools-units"));
        let temps = run(&mut server, "list_units", json!({ "kind": "temperature" }));
        let ids: Vec<&str> = temps["units"].as_array().unwrap().iter().map(|u| u["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["celsius", "fahrenheit", "kelvin"]);
        assert!(call_tool(&mut server, "list_units", &json!({ "kind": "mood" })).is_err());
    }

    #[test]
    fn test_list_functions() {
        let mut server = test_server(scratch_dir("tools-functions"));
        let helpers = run(&mut server, "list_functions", json!({ "category": "helper" }));
        assert_eq!(helpers["functions"].as_array().unwrap().len(), 7);
        assert!(text(&helpers).contains("Math.PI"));
    }

    #[test]
    fn test_fx_rate() {
        let dir = scratch_dir("tools-fx");
        fs::write(
            dir.join("ecb.xml"),
            r#"<Cube><Cube time="2026-10-16"><Cube currency="USD" rate="1.25"/></Cube></Cube>"#,
        )
        .unwrap();
        let mut server = test_server(dir.clone());

        let q = run(&mut server, "fx_rate", json!({}));
        assert_eq!(q["rate"], json!(0.8));
        assert_eq!(q["dateUsed"], "2026-10-16");
        assert_eq!(q["source"], "ECB reference rate");

        let eur_usd = run(&mut server, "fx_rate", json!({ "base": "eur", "quote": "usd" }));
        assert_eq!(eur_usd["rate"], json!(1.25));

        let _ = fs::remove_dir_all(&dir);
        let missing = run(&mut test_server(scratch_dir("tools-fx-missing")), "fx_rate", json!({}));
        assert_eq!(missing["isError"], true);
    }
}
