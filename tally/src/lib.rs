//! Tally - declarative calculator engine
//!
//! Turns a validated [`CalculatorConfig`] plus numeric inputs into results.
//! Expressions run in a small sandboxed language: arithmetic, comparisons,
//! the helpers `pow, min, max, abs, sqrt, log, exp` and the `Math.*`
//! library. Every failure reads as `NaN`, never as a panic.

mod advanced;
mod ast;
mod compiled;
mod eval;
mod format;
mod lexer;
mod parser;

pub use advanced::{evaluate_method, get_output_expression, AdvancedEvaluation, ResolvedVariable};
pub use ast::{BinOp, Expr, LogicalOp, UnaryOp};
pub use compiled::CompiledExpression;
pub use eval::Evaluator;
pub use format::{format_expression_with_values, format_output_value, OutputFormat, OutputValue};
pub use parser::parse_expr;

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tally_config::{check_unit_binding, AdvancedLogic, CalculatorConfig, FormulaLogic, LogicConfig};
use tally_core::{parse_float_prefix, TallyError, Value};
use tally_plugin::{ConstantDef, FunctionMeta, PluginRegistry};
use tally_units::{convert_value, format_formula, format_unit_value, ConversionContext, Direction, UnitKind};

/// Input a conversion calculator reads
pub const CONVERSION_INPUT: &str = "value";

/// Why a config could not be calculated at all
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalculateError {
    #[error("calculator has no logic")]
    MissingLogic,
    #[error("logic type '{0}' cannot be calculated")]
    Unsupported(String),
    #[error("{0}")]
    Binding(String),
}

/// Result of [`Tally::calculate`], one variant per logic kind
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Calculation {
    Conversion(ConversionOutcome),
    Formula(FormulaEvaluation),
    Advanced(AdvancedEvaluation),
}

impl Calculation {
    /// Output values in display order
    pub fn outputs(&self) -> Vec<&OutputValue> {
        match self {
            Calculation::Conversion(c) => vec![&c.output],
            Calculation::Formula(f) => f.outputs.iter().collect(),
            Calculation::Advanced(a) => a.outputs.iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub from: String,
    pub to: String,
    pub kind: UnitKind,
    pub input: f64,
    pub output: OutputValue,
    pub formula: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormulaEvaluation {
    pub outputs: Vec<OutputValue>,
    pub diagnostics: Vec<TallyError>,
}

/// Main Tally engine
pub struct Tally {
    registry: Arc<PluginRegistry>,
    tracing: bool,
}

impl Tally {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            tracing: false,
        }
    }

    pub fn with_standard_library() -> Self {
        Self::new(tally_std::standard_registry())
    }

    /// Record a trace step per advanced variable
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn compile<I, S>(&self, expression: &str, params: I) -> CompiledExpression
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CompiledExpression::compile(expression, params)
    }

    /// One-off evaluation with every input as a parameter
    pub fn eval(&self, expression: &str, inputs: &HashMap<String, f64>) -> Value {
        let mut params: Vec<&String> = inputs.keys().collect();
        params.sort();
        CompiledExpression::compile(expression, params.into_iter().cloned()).eval(inputs, &self.registry)
    }

    pub fn evaluate(&self, expression: &str, inputs: &HashMap<String, f64>) -> f64 {
        self.eval(expression, inputs).to_finite()
    }

    /// Each output compiled against the form field ids
    pub fn evaluate_formula(&self, logic: &FormulaLogic, field_ids: &[String], inputs: &HashMap<String, f64>) -> FormulaEvaluation {
        let mut diagnostics = Vec::new();
        let outputs = logic
            .outputs
            .iter()
            .map(|output| {
                let result = self.compile(&output.expression, field_ids.iter().cloned()).eval(inputs, &self.registry);
                if let Some(e) = result.as_error() {
                    diagnostics.push(e.clone().in_variable(&output.id));
                }
                OutputValue::new(
                    &output.id,
                    &output.label,
                    result.to_finite(),
                    output.unit.as_deref(),
                    output.format.as_deref(),
                )
            })
            .collect();
        FormulaEvaluation { outputs, diagnostics }
    }

    /// Evaluate the method with id `method`, or the default method
    pub fn evaluate_advanced(
        &self,
        logic: &AdvancedLogic,
        method: Option<&str>,
        inputs: &HashMap<String, f64>,
    ) -> Option<AdvancedEvaluation> {
        let method = match method {
            Some(id) => logic.method(Some(id)),
            None => logic.initial_method(),
        }?;
        Some(evaluate_method(method, inputs, &self.registry, self.tracing))
    }

    /// Convert `value` between the bound units
    pub fn convert(&self, context: &ConversionContext, value: f64, direction: Direction) -> ConversionOutcome {
        let (source, target) = match direction {
            Direction::Forward => (context.from(), context.to()),
            Direction::Reverse => (context.to(), context.from()),
        };
        let converted = convert_value(value, direction, context);
        let formula = match direction {
            Direction::Forward => format_formula(context),
            Direction::Reverse => format_formula(&context.swapped()),
        };
        let mut output = OutputValue::new(target.id, target.label, converted, Some(target.symbol), None);
        output.formatted = format_unit_value(converted, target);
        ConversionOutcome {
            from: source.id.to_string(),
            to: target.id.to_string(),
            kind: context.kind(),
            input: value,
            output,
            formula,
        }
    }

    /// Calculate a validated config. Conversions read the `value` input and
    /// run forward; advanced calculators use `method` or their default.
    pub fn calculate(
        &self,
        config: &CalculatorConfig,
        inputs: &HashMap<String, f64>,
        method: Option<&str>,
    ) -> Result<Calculation, CalculateError> {
        let logic = config.logic.as_ref().ok_or(CalculateError::MissingLogic)?;
        match logic {
            LogicConfig::Conversion(_) => {
                let context = check_unit_binding(config, "logic")
                    .map_err(CalculateError::Binding)?
                    .ok_or(CalculateError::MissingLogic)?;
                let value = inputs.get(CONVERSION_INPUT).copied().unwrap_or(f64::NAN);
                Ok(Calculation::Conversion(self.convert(&context, value, Direction::Forward)))
            }
            LogicConfig::Formula(formula) => {
                let field_ids: Vec<String> = config
                    .form
                    .as_ref()
                    .map(|form| form.fields.iter().map(|f| f.id.clone()).collect())
                    .unwrap_or_default();
                Ok(Calculation::Formula(self.evaluate_formula(formula, &field_ids, inputs)))
            }
            LogicConfig::Advanced(advanced) => self
                .evaluate_advanced(advanced, method, inputs)
                .map(Calculation::Advanced)
                .ok_or_else(|| CalculateError::Unsupported("advanced".to_string())),
            LogicConfig::Generic(generic) => Err(CalculateError::Unsupported(generic.kind.clone())),
        }
    }

    pub fn list_functions(&self, category: Option<&str>) -> Vec<FunctionMeta> {
        self.registry.list_functions(category)
    }

    pub fn list_constants(&self) -> Vec<ConstantDef> {
        self.registry.list_constants()
    }

    pub fn help(&self, name: Option<&str>) -> serde_json::Value {
        self.registry.help(name)
    }
}

impl Default for Tally {
    fn default() -> Self {
        Self::with_standard_library()
    }
}

/// Numeric view of raw text inputs: the leading number of each entry, with
/// non-numeric entries left out
pub fn parse_inputs<'a, I>(raw: I) -> HashMap<String, f64>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    raw.into_iter()
        .filter_map(|(id, text)| parse_float_prefix(text).map(|v| (id.clone(), v)))
        .collect()
}

#[macro_export]
macro_rules! inputs {
    {} => { std::collections::HashMap::<String, f64>::new() };
    { $($key:ident : $value:expr),* $(,)? } => {{
        let mut map = std::collections::HashMap::<String, f64>::new();
        $(
            map.insert(stringify!($key).to_string(), ($value) as f64);
        )*
        map
    }};
}
