//! Multi-method calculators: named variables resolved on demand
//!
//! Each variable is computed at most once. Before its expression runs, its
//! declared dependencies are pulled into scope, computing other variables
//! as needed. Re-entering a variable that is still being computed breaks the
//! cycle with `NaN` instead of looping.
//!
//! The scope a variable sees is the inputs, the variables finished before it
//! started (overriding inputs of the same name), and its own dependencies.

use crate::compiled::CompiledExpression;
use crate::format::OutputValue;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tally_config::AdvancedMethod;
use tally_core::TallyError;
use tally_plugin::{EvalContext, PluginRegistry, TraceStep};
use tracing::debug;

/// Value of one variable after resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedVariable {
    pub id: String,
    pub value: f64,
}

/// Outcome of evaluating one method
#[derive(Debug, Clone, Serialize)]
pub struct AdvancedEvaluation {
    pub method: String,
    /// Declaration order
    pub variables: Vec<ResolvedVariable>,
    pub outputs: Vec<OutputValue>,
    /// Why variables came out as `NaN`
    pub diagnostics: Vec<TallyError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceStep>,
}

impl AdvancedEvaluation {
    pub fn variable(&self, id: &str) -> Option<f64> {
        self.variables.iter().find(|v| v.id == id).map(|v| v.value)
    }

    /// Variable values keyed by id, for the audit view
    pub fn values(&self) -> HashMap<String, f64> {
        self.variables.iter().map(|v| (v.id.clone(), v.value)).collect()
    }
}

/// Evaluate every variable of `method` against `inputs`, then read the
/// outputs. An output takes its variable's value, else the input of that
/// name, else `NaN`.
pub fn evaluate_method(
    method: &AdvancedMethod,
    inputs: &HashMap<String, f64>,
    registry: &Arc<PluginRegistry>,
    tracing: bool,
) -> AdvancedEvaluation {
    let mut resolver = Resolver::new(method, inputs, registry, tracing);
    for index in 0..method.variables.len() {
        resolver.resolve(index);
    }

    let outputs = method
        .outputs
        .iter()
        .map(|output| {
            let value = resolver
                .value_of(&output.variable)
                .or_else(|| inputs.get(&output.variable).copied())
                .unwrap_or(f64::NAN);
            OutputValue::new(&output.id, &output.label, value, output.unit.as_deref(), output.format.as_deref())
        })
        .collect();

    let variables = method
        .variables
        .iter()
        .zip(&resolver.values)
        .map(|(v, value)| ResolvedVariable { id: v.id.clone(), value: *value })
        .collect();

    AdvancedEvaluation {
        method: method.id.clone(),
        variables,
        outputs,
        diagnostics: resolver.diagnostics,
        trace: resolver.ctx.trace,
    }
}

/// Expression of the variable an output reads, or `""`
pub fn get_output_expression<'a>(method: &'a AdvancedMethod, output_id: &str) -> &'a str {
    method
        .outputs
        .iter()
        .find(|o| o.id == output_id)
        .and_then(|o| method.variable(&o.variable))
        .map(|v| v.expression.as_str())
        .unwrap_or("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// A variable waiting for its dependencies
struct Frame {
    index: usize,
    scope: HashMap<String, f64>,
    next_dependency: usize,
}

struct Resolver<'a> {
    method: &'a AdvancedMethod,
    inputs: &'a HashMap<String, f64>,
    programs: Vec<CompiledExpression>,
    index: HashMap<&'a str, usize>,
    marks: Vec<Mark>,
    values: Vec<f64>,
    ctx: EvalContext,
    diagnostics: Vec<TallyError>,
}

impl<'a> Resolver<'a> {
    fn new(
        method: &'a AdvancedMethod,
        inputs: &'a HashMap<String, f64>,
        registry: &Arc<PluginRegistry>,
        tracing: bool,
    ) -> Self {
        let count = method.variables.len();
        Self {
            method,
            inputs,
            programs: method
                .variables
                .iter()
                .map(|v| CompiledExpression::compile(&v.expression, std::iter::empty::<String>()))
                .collect(),
            index: method.variables.iter().enumerate().map(|(i, v)| (v.id.as_str(), i)).collect(),
            marks: vec![Mark::Unvisited; count],
            values: vec![f64::NAN; count],
            ctx: EvalContext::new(registry.clone()).with_tracing(tracing),
            diagnostics: Vec::new(),
        }
    }

    /// Memoised value of a declared variable
    fn value_of(&self, id: &str) -> Option<f64> {
        self.index
            .get(id)
            .filter(|i| self.marks[**i] == Mark::Done)
            .map(|i| self.values[*i])
    }

    /// Scope at the moment a variable starts
    fn enter(&mut self, index: usize) -> Frame {
        self.marks[index] = Mark::InProgress;
        let mut scope = self.inputs.clone();
        for (i, v) in self.method.variables.iter().enumerate() {
            if self.marks[i] == Mark::Done {
                scope.insert(v.id.clone(), self.values[i]);
            }
        }
        Frame { index, scope, next_dependency: 0 }
    }

    fn resolve(&mut self, root: usize) {
        if self.marks[root] != Mark::Unvisited {
            return;
        }

        let method = self.method;
        let mut stack = vec![self.enter(root)];

        while let Some(top) = stack.len().checked_sub(1) {
            let variable = &method.variables[stack[top].index];
            let mut descend = None;

            while stack[top].next_dependency < variable.dependencies.len() {
                let dependency = &variable.dependencies[stack[top].next_dependency];
                stack[top].next_dependency += 1;
                if stack[top].scope.contains_key(dependency) {
                    continue;
                }

                let value = match self.index.get(dependency.as_str()).copied() {
                    None => f64::NAN,
                    Some(i) => match self.marks[i] {
                        Mark::Done => self.values[i],
                        Mark::InProgress => {
                            self.break_cycle(&stack, i);
                            f64::NAN
                        }
                        Mark::Unvisited => {
                            descend = Some(i);
                            break;
                        }
                    },
                };
                stack[top].scope.insert(dependency.clone(), value);
            }

            if let Some(i) = descend {
                let frame = self.enter(i);
                stack.push(frame);
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            let value = self.compute(frame);
            if let Some(parent) = stack.last_mut() {
                parent.scope.insert(variable.id.clone(), value);
            }
        }
    }

    /// Run a variable's expression once its dependencies are in scope
    fn compute(&mut self, frame: Frame) -> f64 {
        let variable = &self.method.variables[frame.index];
        self.ctx.variables = frame.scope;

        let result = self.programs[frame.index].eval_in(&self.ctx);
        if let Some(e) = result.as_error() {
            self.diagnostics.push(e.clone().in_variable(&variable.id));
        }
        let value = result.to_finite();

        self.ctx.record_trace(
            variable.id.clone(),
            variable.expression.clone(),
            value,
            variable.dependencies.clone(),
        );
        self.marks[frame.index] = Mark::Done;
        self.values[frame.index] = value;
        value
    }

    fn break_cycle(&mut self, stack: &[Frame], reentered: usize) {
        let start = stack.iter().position(|f| f.index == reentered).unwrap_or(0);
        let mut chain: Vec<String> = stack[start..]
            .iter()
            .map(|f| self.method.variables[f.index].id.clone())
            .collect();
        chain.push(self.method.variables[reentered].id.clone());

        let current = chain[chain.len() - 2].clone();
        debug!(variable = %current, chain = %chain.join(" -> "), "dependency cycle broken with NaN");
        self.diagnostics.push(TallyError::circular_ref(&chain).in_variable(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_config::{AdvancedOutput, VariableDef};
    use tally_core::codes;

    fn var(id: &str, expression: &str, dependencies: &[&str]) -> VariableDef {
        VariableDef {
            id: id.to_string(),
            expression: expression.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn output(id: &str, variable: &str) -> AdvancedOutput {
        AdvancedOutput {
            id: id.to_string(),
            label: id.to_uppercase(),
            variable: variable.to_string(),
            unit: None,
            format: None,
        }
    }

    fn method(variables: Vec<VariableDef>, outputs: Vec<AdvancedOutput>) -> AdvancedMethod {
        AdvancedMethod {
            id: "standard".to_string(),
            label: "Standard".to_string(),
            description: None,
            variables,
            outputs,
        }
    }

    fn run(method: &AdvancedMethod, inputs: &[(&str, f64)]) -> AdvancedEvaluation {
        let inputs: HashMap<String, f64> = inputs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let registry = Arc::new(tally_std::standard_registry());
        evaluate_method(method, &inputs, &registry, false)
    }

    #[test]
    fn test_dependency_chain_out_of_order() {
        // `total` is declared first but needs `tax`, which needs `subtotal`
        let m = method(
            vec![
                var("total", "subtotal + tax", &["subtotal", "tax"]),
                var("tax", "subtotal * rate", &["subtotal"]),
                var("subtotal", "price * qty", &[]),
            ],
            vec![output("total", "total")],
        );
        let result = run(&m, &[("price", 10.0), ("qty", 3.0), ("rate", 0.1)]);
        assert_eq!(result.variable("subtotal"), Some(30.0));
        assert_eq!(result.variable("tax"), Some(3.0));
        assert_eq!(result.variable("total"), Some(33.0));
        assert_eq!(result.outputs[0].value, 33.0);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_cycle_yields_nan() {
        let m = method(
            vec![var("a", "b + 1", &["b"]), var("b", "a + 1", &["a"])],
            vec![output("a", "a"), output("b", "b")],
        );
        let result = run(&m, &[]);
        assert!(result.variable("a").unwrap().is_nan());
        assert!(result.variable("b").unwrap().is_nan());
        assert!(result.outputs.iter().all(|o| o.value.is_nan()));
        let cycle = result
            .diagnostics
            .iter()
            .find(|d| d.code == codes::CIRCULAR_REF)
            .unwrap();
        assert_eq!(cycle.message, "Circular reference: a → b → a");
        assert_eq!(cycle.context.as_ref().unwrap().variable.as_deref(), Some("b"));
    }

    #[test]
    fn test_self_reference_yields_nan() {
        let m = method(vec![var("x", "x * 2", &["x"])], vec![output("x", "x")]);
        let result = run(&m, &[]);
        assert!(result.variable("x").unwrap().is_nan());
    }

    #[test]
    fn test_undeclared_dependency_is_not_in_scope() {
        // `b` finishes after `a` started, so `a` cannot see it without declaring it
        let m = method(
            vec![var("a", "b * 2", &[]), var("b", "5", &[])],
            vec![output("a", "a")],
        );
        let result = run(&m, &[]);
        assert!(result.variable("a").unwrap().is_nan());
        assert_eq!(result.variable("b"), Some(5.0));
        assert_eq!(result.diagnostics[0].code, codes::UNDEFINED_VAR);
    }

    #[test]
    fn test_finished_variables_visible_without_declaration() {
        let m = method(vec![var("b", "5", &[]), var("a", "b * 2", &[])], vec![output("a", "a")]);
        assert_eq!(run(&m, &[]).variable("a"), Some(10.0));
    }

    #[test]
    fn test_unknown_dependency_is_nan() {
        let m = method(vec![var("a", "ghost + 1", &["ghost"])], vec![output("a", "a")]);
        assert!(run(&m, &[]).variable("a").unwrap().is_nan());
    }

    #[test]
    fn test_input_satisfies_dependency() {
        let m = method(vec![var("area", "width * height", &["width", "height"])], vec![output("area", "area")]);
        assert_eq!(run(&m, &[("width", 3.0), ("height", 4.0)]).variable("area"), Some(12.0));
    }

    #[test]
    fn test_variable_overrides_input_of_same_name() {
        let m = method(
            vec![var("rate", "5", &[]), var("cost", "rate * 2", &[])],
            vec![output("cost", "cost")],
        );
        assert_eq!(run(&m, &[("rate", 100.0)]).variable("cost"), Some(10.0));
    }

    #[test]
    fn test_output_falls_back_to_input() {
        let m = method(
            vec![var("broken", "1 / 0", &[])],
            vec![output("echo", "principal"), output("broken", "broken"), output("none", "nothing")],
        );
        let result = run(&m, &[("principal", 1200.0), ("broken", 7.0)]);
        assert_eq!(result.outputs[0].value, 1200.0);
        // a NaN variable still shadows the input
        assert!(result.outputs[1].value.is_nan());
        assert!(result.outputs[2].value.is_nan());
    }

    #[test]
    fn test_deterministic() {
        let m = method(
            vec![var("monthly", "principal * r / (1 - pow(1 + r, -n))", &["r", "n"]),
                 var("r", "rate / 12", &[]),
                 var("n", "years * 12", &[])],
            vec![output("monthly", "monthly")],
        );
        let inputs = [("principal", 300000.0), ("rate", 0.06), ("years", 30.0)];
        let first = run(&m, &inputs).variable("monthly").unwrap();
        let second = run(&m, &inputs).variable("monthly").unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
        assert!((first - 1798.65).abs() < 0.01);
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let count = 5000;
        let variables: Vec<VariableDef> = (0..count)
            .map(|i| {
                if i + 1 == count {
                    var(&format!("v{}", i), "1", &[])
                } else {
                    let next = format!("v{}", i + 1);
                    var(&format!("v{}", i), &format!("{} + 1", next), &[next.as_str()])
                }
            })
            .collect();
        let m = method(variables, vec![output("head", "v0")]);
        assert_eq!(run(&m, &[]).outputs[0].value, count as f64);
    }

    #[test]
    fn test_trace_records_each_variable() {
        let m = method(vec![var("a", "1", &[]), var("b", "a + 1", &["a"])], vec![output("b", "b")]);
        let registry = Arc::new(tally_std::standard_registry());
        let result = evaluate_method(&m, &HashMap::new(), &registry, true);
        let order: Vec<&str> = result.trace.iter().map(|s| s.variable.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_output_expression_lookup() {
        let m = method(vec![var("a", "x * 2", &[])], vec![output("double", "a"), output("raw", "x")]);
        assert_eq!(get_output_expression(&m, "double"), "x * 2");
        assert_eq!(get_output_expression(&m, "raw"), "");
        assert_eq!(get_output_expression(&m, "missing"), "");
    }
}
