//! Structured evaluation errors
//!
//! Errors are values. They propagate through a computation and only collapse
//! into a `NaN` sentinel at the public boundary of the engine.

use crate::NumberError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const UNDEFINED_VAR: &str = "UNDEFINED_VAR";
    pub const UNDEFINED_FUNC: &str = "UNDEFINED_FUNC";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const NON_FINITE: &str = "NON_FINITE";
    pub const CIRCULAR_REF: &str = "CIRCULAR_REF";
}

/// Where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Variable or output being computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,

    /// Expression source text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Byte offset inside the expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error carried through evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

impl TallyError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set the variable being computed
    pub fn in_variable(mut self, variable: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.variable = Some(variable.into());
        self
    }

    /// Builder: set expression source
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.expression = Some(expression.into());
        self
    }

    /// Builder: set byte offset
    pub fn at(mut self, position: usize) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.position = Some(position);
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    // ========== Common Error Constructors ==========

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Check expression syntax")
    }

    pub fn undefined_var(name: &str) -> Self {
        Self::new(codes::UNDEFINED_VAR, format!("Undefined identifier: {}", name))
            .with_suggestion(format!("Declare '{}' as a form field or variable", name))
    }

    pub fn undefined_func(name: &str) -> Self {
        Self::new(codes::UNDEFINED_FUNC, format!("Unknown function: {}", name))
            .with_suggestion("Available helpers: pow, min, max, abs, sqrt, log, exp")
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(codes::TYPE_ERROR, format!("Expected {}, got {}", expected, got))
    }

    pub fn arg_count(func: &str, expected: usize, got: usize) -> Self {
        Self::new(
            codes::ARG_COUNT,
            format!("{}() expects {} arguments, got {}", func, expected, got),
        )
    }

    pub fn non_finite(value: f64) -> Self {
        Self::new(codes::NON_FINITE, format!("Result is not finite: {}", value))
    }

    pub fn circular_ref(chain: &[String]) -> Self {
        Self::new(
            codes::CIRCULAR_REF,
            format!("Circular reference: {}", chain.join(" → ")),
        )
        .with_suggestion("Remove the circular dependency")
    }
}

impl std::fmt::Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for TallyError {}

impl From<NumberError> for TallyError {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::InvalidFormat(s) => Self::parse_error(format!("invalid number '{}'", s)),
            NumberError::NonFinite(v) => Self::non_finite(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_fill_context() {
        let err = TallyError::undefined_var("rate")
            .in_variable("payment")
            .with_expression("principal * rate")
            .with_note("while resolving dependencies");
        let ctx = err.context.as_ref().unwrap();
        assert_eq!(ctx.variable.as_deref(), Some("payment"));
        assert_eq!(ctx.expression.as_deref(), Some("principal * rate"));
        assert_eq!(ctx.notes.len(), 1);
        assert_eq!(err.code, codes::UNDEFINED_VAR);
    }

    #[test]
    fn test_display_includes_code_and_suggestion() {
        let err = TallyError::undefined_var("rate");
        let text = err.to_string();
        assert!(text.starts_with("[UNDEFINED_VAR]"));
        assert!(text.contains("suggestion"));
    }

    #[test]
    fn test_circular_ref_chain() {
        let err = TallyError::circular_ref(&["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(err.message, "Circular reference: a → b → a");
    }

    #[test]
    fn test_from_number_error() {
        let err: TallyError = NumberError::InvalidFormat("1..2".to_string()).into();
        assert_eq!(err.code, codes::PARSE_ERROR);
    }
}
