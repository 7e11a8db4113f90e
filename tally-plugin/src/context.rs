//! Evaluation Context

use crate::PluginRegistry;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tally_core::{TallyError, Value};

/// Scope and function table for one evaluation
pub struct EvalContext {
    pub variables: HashMap<String, f64>,
    pub registry: Arc<PluginRegistry>,
    pub tracing: bool,
    pub trace: Vec<TraceStep>,
}

/// Single step in an evaluation trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    pub variable: String,
    pub expression: String,
    pub result: f64,
    pub dependencies: Vec<String>,
}

impl EvalContext {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            variables: HashMap::new(),
            registry,
            tracing: false,
            trace: Vec::new(),
        }
    }

    pub fn with_variables(mut self, vars: HashMap<String, f64>) -> Self {
        self.variables = vars;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    /// Look up a bare identifier
    pub fn get_var(&self, name: &str) -> Value {
        match self.variables.get(name) {
            Some(v) => Value::Number(*v),
            None => Value::Error(TallyError::undefined_var(name)),
        }
    }

    /// Look up a `Math.NAME` constant
    pub fn get_constant(&self, name: &str) -> Value {
        match self.registry.get_constant(name) {
            Some(c) => Value::Number(c.value),
            None => Value::Error(TallyError::undefined_var(&format!("Math.{}", name))),
        }
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: f64) {
        self.variables.insert(name.into(), value);
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn record_trace(&mut self, variable: String, expression: String, result: f64, dependencies: Vec<String>) {
        if self.tracing {
            self.trace.push(TraceStep { variable, expression, result, dependencies });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConstantDef;

    #[test]
    fn test_get_var_and_constant() {
        let registry = PluginRegistry::new().with_constant(ConstantDef {
            name: "PI".to_string(),
            value: std::f64::consts::PI,
            description: "Ratio of circumference to diameter".to_string(),
        });
        let mut ctx = EvalContext::new(Arc::new(registry));
        ctx.set_var("x", 4.0);
        assert_eq!(ctx.get_var("x"), Value::Number(4.0));
        assert!(ctx.get_var("y").is_error());
        assert_eq!(ctx.get_constant("PI"), Value::Number(std::f64::consts::PI));
        assert!(ctx.get_constant("TAU").is_error());
    }

    #[test]
    fn test_trace_only_when_enabled() {
        let mut ctx = EvalContext::new(Arc::new(PluginRegistry::new()));
        ctx.record_trace("a".into(), "1 + 1".into(), 2.0, vec![]);
        assert!(ctx.trace.is_empty());

        let mut ctx = ctx.with_tracing(true);
        ctx.record_trace("a".into(), "1 + 1".into(), 2.0, vec![]);
        assert_eq!(ctx.trace.len(), 1);
    }
}
