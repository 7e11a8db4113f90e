//! Tally Plugin System
//!
//! Provides the trait and registry for the whitelisted functions an
//! expression may call.

mod context;
mod registry;
mod traits;

pub use context::{EvalContext, TraceStep};
pub use registry::{ConstantDef, PluginRegistry};
pub use traits::{ArgMeta, FunctionMeta, FunctionPlugin, HELPER_CATEGORY, MATH_CATEGORY};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        ArgMeta, EvalContext, FunctionMeta, FunctionPlugin, PluginRegistry, HELPER_CATEGORY,
        MATH_CATEGORY,
    };
    pub use tally_core::prelude::*;
}
