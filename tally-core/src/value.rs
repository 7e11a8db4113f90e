//! Runtime values produced while evaluating an expression

use crate::TallyError;
use serde::{Deserialize, Serialize};

/// Runtime value
///
/// Comparisons and logical operators produce booleans; everything that
/// reaches a caller must be a finite number, anything else reads as `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Error(TallyError),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&TallyError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Bool(_) => "Bool",
            Value::Error(_) => "Error",
        }
    }

    /// Numeric coercion used by arithmetic (`true + 1 == 2`)
    pub fn to_number(&self) -> Value {
        match self {
            Value::Number(n) => Value::Number(*n),
            Value::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
            Value::Error(e) => Value::Error(e.clone()),
        }
    }

    /// Truthiness for `&&`, `||`, `!` and `?:`. Zero and `NaN` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::Error(_) => false,
        }
    }

    /// Collapse to the public sentinel: a finite number, or `NaN`.
    pub fn to_finite(&self) -> f64 {
        match self {
            Value::Number(n) if n.is_finite() => *n,
            _ => f64::NAN,
        }
    }

    /// JSON view: finite numbers as numbers, everything else as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let n = self.to_finite();
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Error(e) => write!(f, "#ERROR: {}", e.code),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(f64::NAN)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<TallyError> for Value {
    fn from(e: TallyError) -> Self {
        Value::Error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_finite_collapses_non_numbers() {
        assert_eq!(Value::Number(2.5).to_finite(), 2.5);
        assert!(Value::Number(f64::INFINITY).to_finite().is_nan());
        assert!(Value::Bool(true).to_finite().is_nan());
        assert!(Value::Error(TallyError::non_finite(f64::INFINITY)).to_finite().is_nan());
    }

    #[test]
    fn test_bool_coerces_in_arithmetic() {
        assert_eq!(Value::Bool(true).to_number(), Value::Number(1.0));
        assert_eq!(Value::Bool(false).to_number(), Value::Number(0.0));
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Number(3.0).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }

    #[test]
    fn test_json_view() {
        assert_eq!(Value::Number(1.5).to_json(), serde_json::json!(1.5));
        assert_eq!(Value::Number(f64::NAN).to_json(), serde_json::Value::Null);
    }
}
