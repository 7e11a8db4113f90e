//! The seven helpers callable by bare name: pow, min, max, abs, sqrt, log, exp

use super::numeric_args;
use tally_plugin::prelude::*;

pub struct Pow;
pub struct Min;
pub struct Max;
pub struct Abs;
pub struct Sqrt;
pub struct Log;
pub struct Exp;

static POW_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("base", "Base value"),
    ArgMeta::required("exponent", "Exponent, may be fractional"),
];
static POW_EXAMPLES: [&str; 2] = ["pow(2, 10)", "pow(1 + rate / 12, months)"];
static POW_RELATED: [&str; 2] = ["sqrt", "exp"];

static MIN_ARGS: [ArgMeta; 1] = [ArgMeta::variadic("values", "Values to compare")];
static MIN_EXAMPLES: [&str; 2] = ["min(a, b)", "min(income * 0.2, 5000)"];
static MIN_RELATED: [&str; 1] = ["max"];

static MAX_ARGS: [ArgMeta; 1] = [ArgMeta::variadic("values", "Values to compare")];
static MAX_EXAMPLES: [&str; 2] = ["max(a, b)", "max(0, profit)"];
static MAX_RELATED: [&str; 1] = ["min"];

static ABS_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Value")];
static ABS_EXAMPLES: [&str; 2] = ["abs(-5)", "abs(target - actual)"];
static ABS_RELATED: [&str; 0] = [];

static SQRT_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Value (negative yields NaN)")];
static SQRT_EXAMPLES: [&str; 2] = ["sqrt(16)", "sqrt(a * a + b * b)"];
static SQRT_RELATED: [&str; 2] = ["pow", "exp"];

static LOG_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Value (must be positive)")];
static LOG_EXAMPLES: [&str; 2] = ["log(Math.E)", "log(2)"];
static LOG_RELATED: [&str; 1] = ["exp"];

static EXP_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Exponent")];
static EXP_EXAMPLES: [&str; 2] = ["exp(1)", "exp(-rate * years)"];
static EXP_RELATED: [&str; 2] = ["log", "pow"];

/// `x^y` with the IEEE special cases a browser applies
pub fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

impl FunctionPlugin for Pow {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "pow",
            description: "Raise to power",
            usage: "pow(base, exponent)",
            args: &POW_ARGS,
            returns: "Number",
            examples: &POW_EXAMPLES,
            category: HELPER_CATEGORY,
            related: &POW_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match numeric_args("pow", args, Some(2)) {
            Ok(n) => Value::Number(js_pow(n[0], n[1])),
            Err(e) => e,
        }
    }
}

impl FunctionPlugin for Min {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "min",
            description: "Smallest of the arguments; NaN if any argument is NaN",
            usage: "min(a, b, ...)",
            args: &MIN_ARGS,
            returns: "Number",
            examples: &MIN_EXAMPLES,
            category: HELPER_CATEGORY,
            related: &MIN_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match numeric_args("min", args, None) {
            Ok(n) => Value::Number(n.into_iter().fold(f64::INFINITY, |acc, x| {
                if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.min(x) }
            })),
            Err(e) => e,
        }
    }
}

impl FunctionPlugin for Max {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "max",
            description: "Largest of the arguments; NaN if any argument is NaN",
            usage: "max(a, b, ...)",
            args: &MAX_ARGS,
            returns: "Number",
            examples: &MAX_EXAMPLES,
            category: HELPER_CATEGORY,
            related: &MAX_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match numeric_args("max", args, None) {
            Ok(n) => Value::Number(n.into_iter().fold(f64::NEG_INFINITY, |acc, x| {
                if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.max(x) }
            })),
            Err(e) => e,
        }
    }
}

impl FunctionPlugin for Abs {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "abs",
            description: "Absolute value",
            usage: "abs(x)",
            args: &ABS_ARGS,
            returns: "Number",
            examples: &ABS_EXAMPLES,
            category: HELPER_CATEGORY,
            related: &ABS_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match numeric_args("abs", args, Some(1)) {
            Ok(n) => Value::Number(n[0].abs()),
            Err(e) => e,
        }
    }
}

impl FunctionPlugin for Sqrt {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "sqrt",
            description: "Square root",
            usage: "sqrt(x)",
            args: &SQRT_ARGS,
            returns: "Number",
            examples: &SQRT_EXAMPLES,
            category: HELPER_CATEGORY,
            related: &SQRT_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match numeric_args("sqrt", args, Some(1)) {
            Ok(n) => Value::Number(n[0].sqrt()),
            Err(e) => e,
        }
    }
}

impl FunctionPlugin for Log {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "log",
            description: "Natural logarithm",
            usage: "log(x)",
            args: &LOG_ARGS,
            returns: "Number",
            examples: &LOG_EXAMPLES,
            category: HELPER_CATEGORY,
            related: &LOG_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match numeric_args("log", args, Some(1)) {
            Ok(n) => Value::Number(n[0].ln()),
            Err(e) => e,
        }
    }
}

impl FunctionPlugin for Exp {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "exp",
            description: "Exponential function (e^x)",
            usage: "exp(x)",
            args: &EXP_ARGS,
            returns: "Number",
            examples: &EXP_EXAMPLES,
            category: HELPER_CATEGORY,
            related: &EXP_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match numeric_args("exp", args, Some(1)) {
            Ok(n) => Value::Number(n[0].exp()),
            Err(e) => e,
        }
    }
}
