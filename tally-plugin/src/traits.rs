//! Plugin traits

use crate::EvalContext;
use serde::Serialize;
use tally_core::Value;

/// Category of functions callable without the `Math.` qualifier
pub const HELPER_CATEGORY: &str = "helper";

/// Category of functions reachable only as `Math.name(...)`
pub const MATH_CATEGORY: &str = "math";

/// Metadata about a function argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
    /// Accepts any number of trailing arguments of this shape
    pub variadic: bool,
}

impl ArgMeta {
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self { name, typ: "Number", description, optional: false, variadic: false }
    }

    pub const fn variadic(name: &'static str, description: &'static str) -> Self {
        Self { name, typ: "Number", description, optional: true, variadic: true }
    }
}

/// Metadata for a function plugin
#[derive(Debug, Clone, Serialize)]
pub struct FunctionMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub args: &'static [ArgMeta],
    pub returns: &'static str,
    pub examples: &'static [&'static str],
    pub category: &'static str,
    pub related: &'static [&'static str],
}

impl FunctionMeta {
    pub fn is_helper(&self) -> bool {
        self.category == HELPER_CATEGORY
    }
}

/// Pure numeric function
pub trait FunctionPlugin: Send + Sync {
    fn meta(&self) -> FunctionMeta;
    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value;
}
