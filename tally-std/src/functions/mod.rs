//! Standard math functions

mod helpers;
mod math;

pub use helpers::{js_pow, Abs, Exp, Log, Max, Min, Pow, Sqrt};
pub use math::{js_round, Atan, Cbrt, Ceil, Cos, Floor, Hypot, Log10, Log2, Round, Sign, Sin, Tan, Trunc};

use tally_core::{TallyError, Value};

/// Coerce arguments to numbers, propagating the first error.
///
/// With `expected = Some(n)` the call must supply exactly `n` arguments;
/// extra arguments are an `ARG_COUNT` error rather than being ignored.
pub(crate) fn numeric_args(name: &str, args: &[Value], expected: Option<usize>) -> Result<Vec<f64>, Value> {
    if let Some(n) = expected {
        if args.len() != n {
            return Err(Value::Error(TallyError::arg_count(name, n, args.len())));
        }
    }

    args.iter()
        .map(|arg| match arg.to_number() {
            Value::Number(n) => Ok(n),
            Value::Error(e) => Err(Value::Error(e.with_note(format!("argument of {}()", name)))),
            other => Err(Value::Error(TallyError::type_error("Number", other.type_name()))),
        })
        .collect()
}
