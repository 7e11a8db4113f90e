//! Tally Config - validation of untrusted calculator documents
//!
//! A raw JSON document is checked against a closed schema and turned into a
//! typed [`CalculatorConfig`]. Every problem is collected as a message
//! prefixed with the caller's context; a document with any error yields no
//! config.

mod bind;
mod content;
mod form;
mod logic;
mod types;
mod validate;

pub use bind::check_unit_binding;
pub use types::*;
pub use validate::{format_validation_errors, parse_calculator_config, validate_calculator_config, ValidationResult};
