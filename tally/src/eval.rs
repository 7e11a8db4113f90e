//! AST evaluator
//!
//! Arithmetic follows IEEE-754 double semantics: `1 / 0` is `Infinity` and
//! `0 / 0` is `NaN` inside an expression. Only the caller collapses a
//! non-finite result to the `NaN` sentinel.

use crate::ast::{BinOp, Expr, LogicalOp, UnaryOp};
use tally_core::{TallyError, Value};
use tally_plugin::EvalContext;
use tally_std::functions::js_pow;

/// Expression evaluator
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate single expression
    pub fn eval_expr(&self, expr: &Expr, ctx: &EvalContext) -> Value {
        match expr {
            Expr::Number(n) => Value::Number(*n),

            Expr::Variable(name) => ctx.get_var(name),

            Expr::Constant(name) => ctx.get_constant(name),

            Expr::Call { name, qualified, args } => {
                if ctx.registry.lookup(name, *qualified).is_none() {
                    return ctx.registry.call_function(name, *qualified, &[], ctx);
                }
                let evaluated_args: Vec<Value> = args.iter().map(|a| self.eval_expr(a, ctx)).collect();
                ctx.registry.call_function(name, *qualified, &evaluated_args, ctx)
            }

            Expr::Binary(left, op, right) => {
                let l = self.eval_expr(left, ctx);
                let r = self.eval_expr(right, ctx);
                self.eval_binary_op(l, *op, r)
            }

            Expr::Unary(op, inner) => {
                let v = self.eval_expr(inner, ctx);
                self.eval_unary_op(*op, v)
            }

            Expr::Logical(left, op, right) => {
                let l = self.eval_expr(left, ctx);
                if l.is_error() {
                    return l;
                }
                match (op, l.is_truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => l,
                    _ => self.eval_expr(right, ctx),
                }
            }

            Expr::Ternary { condition, then, otherwise } => {
                let c = self.eval_expr(condition, ctx);
                if let Value::Error(e) = c {
                    return Value::Error(e.with_note("from condition"));
                }
                if c.is_truthy() {
                    self.eval_expr(then, ctx)
                } else {
                    self.eval_expr(otherwise, ctx)
                }
            }
        }
    }

    fn eval_binary_op(&self, left: Value, op: BinOp, right: Value) -> Value {
        // Propagate errors
        if let Value::Error(e) = &left {
            return Value::Error(e.clone().with_note("from left operand"));
        }
        if let Value::Error(e) = &right {
            return Value::Error(e.clone().with_note("from right operand"));
        }

        if let BinOp::StrictEq | BinOp::StrictNe = op {
            return Value::Bool(strict_equals(&left, &right) == (op == BinOp::StrictEq));
        }

        // Booleans coerce to 0 / 1 for everything else
        let (l, r) = match (left.to_number(), right.to_number()) {
            (Value::Number(l), Value::Number(r)) => (l, r),
            (l, r) => {
                return Value::Error(TallyError::type_error(
                    "Number",
                    if l.as_number().is_none() { l.type_name() } else { r.type_name() },
                ))
            }
        };

        match op {
            BinOp::Add => Value::Number(l + r),
            BinOp::Sub => Value::Number(l - r),
            BinOp::Mul => Value::Number(l * r),
            BinOp::Div => Value::Number(l / r),
            BinOp::Rem => Value::Number(l % r),
            BinOp::Pow => Value::Number(js_pow(l, r)),
            BinOp::Lt => Value::Bool(l < r),
            BinOp::Le => Value::Bool(l <= r),
            BinOp::Gt => Value::Bool(l > r),
            BinOp::Ge => Value::Bool(l >= r),
            BinOp::Eq => Value::Bool(l == r),
            BinOp::Ne | BinOp::StrictNe => Value::Bool(l != r),
            BinOp::StrictEq => Value::Bool(l == r),
        }
    }

    fn eval_unary_op(&self, op: UnaryOp, value: Value) -> Value {
        if let Value::Error(e) = &value {
            return Value::Error(e.clone());
        }

        match op {
            UnaryOp::Not => Value::Bool(!value.is_truthy()),
            UnaryOp::Neg => match value.to_number() {
                Value::Number(n) => Value::Number(-n),
                other => other,
            },
            UnaryOp::Plus => value.to_number(),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// `===`: same type and same value, `NaN` never equal
fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l == r,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        _ => false,
    }
}
