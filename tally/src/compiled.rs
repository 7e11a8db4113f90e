//! Expressions parsed once and evaluated many times

use crate::ast::Expr;
use crate::eval::Evaluator;
use crate::parser::parse_expr;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tally_core::{TallyError, Value};
use tally_plugin::{EvalContext, PluginRegistry};

/// An expression bound to a fixed parameter list.
///
/// Parsing happens once in [`CompiledExpression::compile`]; a syntax error is
/// kept and every later evaluation reports it.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    params: Vec<String>,
    program: Result<Expr, TallyError>,
}

impl CompiledExpression {
    /// Compile `source` against the identifiers in `params`. Duplicate
    /// parameters are collapsed, first occurrence kept.
    pub fn compile<I, S>(source: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for p in params {
            let p = p.into();
            if !unique.contains(&p) {
                unique.push(p);
            }
        }
        Self {
            source: source.to_string(),
            params: unique,
            program: parse_expr(source),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn parse_error(&self) -> Option<&TallyError> {
        self.program.as_ref().err()
    }

    /// Scope identifiers the expression reads; empty when it failed to parse
    pub fn identifiers(&self) -> BTreeSet<String> {
        self.program.as_ref().map(Expr::identifiers).unwrap_or_default()
    }

    /// Evaluate with each parameter bound to its input, or `NaN` when the
    /// input is missing. Identifiers outside the parameter list are undefined.
    pub fn eval(&self, inputs: &HashMap<String, f64>, registry: &Arc<PluginRegistry>) -> Value {
        let scope: HashMap<String, f64> = self
            .params
            .iter()
            .map(|p| (p.clone(), inputs.get(p).copied().unwrap_or(f64::NAN)))
            .collect();
        let ctx = EvalContext::new(registry.clone()).with_variables(scope);
        self.eval_in(&ctx)
    }

    /// Evaluate to a finite number or `NaN`
    pub fn evaluate(&self, inputs: &HashMap<String, f64>, registry: &Arc<PluginRegistry>) -> f64 {
        self.eval(inputs, registry).to_finite()
    }

    /// Evaluate against the variables already in `ctx`, ignoring the
    /// parameter list.
    pub fn eval_in(&self, ctx: &EvalContext) -> Value {
        match &self.program {
            Ok(expr) => settle(Evaluator::new().eval_expr(expr, ctx), &self.source),
            Err(e) => Value::Error(e.clone()),
        }
    }
}

/// Only a finite number is a usable result. Anything else turns into an
/// error carrying the expression source.
fn settle(value: Value, source: &str) -> Value {
    match value {
        Value::Number(n) if n.is_finite() => Value::Number(n),
        Value::Number(n) => Value::Error(TallyError::non_finite(n).with_expression(source)),
        Value::Bool(_) => Value::Error(TallyError::type_error("Number", "Bool").with_expression(source)),
        Value::Error(e) => Value::Error(e.with_expression(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::codes;

    fn registry() -> Arc<PluginRegistry> {
        Arc::new(tally_std::standard_registry())
    }

    fn inputs(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_evaluates_against_params() {
        let bmi = CompiledExpression::compile("weight / pow(height / 100, 2)", ["weight", "height"]);
        let value = bmi.evaluate(&inputs(&[("weight", 81.0), ("height", 180.0)]), &registry());
        assert!((value - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let expr = CompiledExpression::compile("principal * pow(1 + rate / 12, 360) / 7", ["principal", "rate"]);
        let scope = inputs(&[("principal", 250000.0), ("rate", 0.065)]);
        let first = expr.evaluate(&scope, &registry());
        let second = expr.evaluate(&scope, &registry());
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_missing_input_is_nan() {
        let expr = CompiledExpression::compile("a + b", ["a", "b"]);
        assert!(expr.evaluate(&inputs(&[("a", 1.0)]), &registry()).is_nan());
    }

    #[test]
    fn test_identifier_outside_params_is_undefined() {
        let expr = CompiledExpression::compile("a + secret", ["a"]);
        let result = expr.eval(&inputs(&[("a", 1.0), ("secret", 2.0)]), &registry());
        assert_eq!(result.as_error().unwrap().code, codes::UNDEFINED_VAR);
        assert!(result.to_finite().is_nan());
    }

    #[test]
    fn test_syntax_error_always_nan() {
        let expr = CompiledExpression::compile("a +* b", ["a", "b"]);
        assert!(expr.parse_error().is_some());
        assert!(expr.identifiers().is_empty());
        assert!(expr.evaluate(&inputs(&[("a", 1.0), ("b", 2.0)]), &registry()).is_nan());
    }

    #[test]
    fn test_non_finite_and_boolean_results() {
        let expr = CompiledExpression::compile("a / b", ["a", "b"]);
        let result = expr.eval(&inputs(&[("a", 1.0), ("b", 0.0)]), &registry());
        assert_eq!(result.as_error().unwrap().code, codes::NON_FINITE);

        let expr = CompiledExpression::compile("a > b", ["a", "b"]);
        let result = expr.eval(&inputs(&[("a", 1.0), ("b", 0.0)]), &registry());
        assert_eq!(result.as_error().unwrap().code, codes::TYPE_ERROR);
    }

    #[test]
    fn test_params_deduplicated() {
        let expr = CompiledExpression::compile("x", ["x", "y", "x"]);
        assert_eq!(expr.params(), ["x".to_string(), "y".to_string()]);
    }
}
