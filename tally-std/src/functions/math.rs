//! `Math.*` functions outside the bare helper set

use super::numeric_args;
use tally_plugin::prelude::*;

macro_rules! unary_math {
    ($ty:ident, $name:literal, $desc:literal, $f:expr) => {
        pub struct $ty;

        impl FunctionPlugin for $ty {
            fn meta(&self) -> FunctionMeta {
                static ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Value")];
                FunctionMeta {
                    name: $name,
                    description: $desc,
                    usage: concat!("Math.", $name, "(x)"),
                    args: &ARGS,
                    returns: "Number",
                    examples: &[],
                    category: MATH_CATEGORY,
                    related: &[],
                }
            }

            fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
                let f: fn(f64) -> f64 = $f;
                match numeric_args($name, args, Some(1)) {
                    Ok(n) => Value::Number(f(n[0])),
                    Err(e) => e,
                }
            }
        }
    };
}

unary_math!(Round, "round", "Round half up to the nearest integer", js_round);
unary_math!(Floor, "floor", "Largest integer not above x", f64::floor);
unary_math!(Ceil, "ceil", "Smallest integer not below x", f64::ceil);
unary_math!(Trunc, "trunc", "Integer part of x", f64::trunc);
unary_math!(Sign, "sign", "-1, 0 or 1 by the sign of x", js_sign);
unary_math!(Log10, "log10", "Base-10 logarithm", f64::log10);
unary_math!(Log2, "log2", "Base-2 logarithm", f64::log2);
unary_math!(Cbrt, "cbrt", "Cube root", f64::cbrt);
unary_math!(Sin, "sin", "Sine (radians)", f64::sin);
unary_math!(Cos, "cos", "Cosine (radians)", f64::cos);
unary_math!(Tan, "tan", "Tangent (radians)", f64::tan);
unary_math!(Atan, "atan", "Arctangent (radians)", f64::atan);

/// Rounds `.5` toward positive infinity: `round(-2.5) == -2`
pub fn js_round(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

fn js_sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 { x } else { x.signum() }
}

pub struct Hypot;

static HYPOT_ARGS: [ArgMeta; 1] = [ArgMeta::variadic("values", "Components")];
static HYPOT_EXAMPLES: [&str; 1] = ["Math.hypot(3, 4)"];

impl FunctionPlugin for Hypot {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "hypot",
            description: "Square root of the sum of squares",
            usage: "Math.hypot(a, b, ...)",
            args: &HYPOT_ARGS,
            returns: "Number",
            examples: &HYPOT_EXAMPLES,
            category: MATH_CATEGORY,
            related: &["sqrt"],
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match numeric_args("hypot", args, None) {
            Ok(n) => Value::Number(n.iter().map(|x| x * x).sum::<f64>().sqrt()),
            Err(e) => e,
        }
    }
}
