//! Tally Core - Fundamental types
//!
//! This crate provides the core types used throughout Tally:
//! - `Value`: runtime values (numbers, booleans, errors)
//! - `TallyError`: structured errors that travel as values
//! - number parsing and en-US rendering helpers

mod error;
mod format;
mod number;
mod value;

pub use error::{codes, ErrorContext, TallyError};
pub use format::{format_fixed, format_grouped, format_locale, format_usd, UNAVAILABLE};
pub use number::{parse_float_prefix, parse_number, NumberError};
pub use value::Value;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{TallyError, Value};
}
