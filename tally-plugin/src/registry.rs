//! Function registry

use crate::{EvalContext, FunctionMeta, FunctionPlugin};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tally_core::{TallyError, Value};

/// Definition of a named constant (`Math.PI`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantDef {
    pub name: String,
    pub value: f64,
    pub description: String,
}

/// Central function registry
///
/// Names are case-sensitive. Bare calls (`sqrt(x)`) reach only functions in
/// the helper category; qualified calls (`Math.sqrt(x)`) reach every function.
pub struct PluginRegistry {
    functions: HashMap<String, Arc<dyn FunctionPlugin>>,
    constants: HashMap<String, ConstantDef>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            constants: HashMap::new(),
        }
    }

    pub fn with_function<F: FunctionPlugin + 'static>(mut self, f: F) -> Self {
        let name = f.meta().name.to_string();
        self.functions.insert(name, Arc::new(f));
        self
    }

    pub fn with_constant(mut self, def: ConstantDef) -> Self {
        self.constants.insert(def.name.clone(), def);
        self
    }

    pub fn get_function(&self, name: &str) -> Option<&dyn FunctionPlugin> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    /// Function visible under the given call style
    pub fn lookup(&self, name: &str, qualified: bool) -> Option<&dyn FunctionPlugin> {
        self.get_function(name)
            .filter(|f| qualified || f.meta().is_helper())
    }

    pub fn get_constant(&self, name: &str) -> Option<&ConstantDef> {
        self.constants.get(name)
    }

    pub fn call_function(&self, name: &str, qualified: bool, args: &[Value], ctx: &EvalContext) -> Value {
        match self.lookup(name, qualified) {
            Some(f) => f.call(args, ctx),
            None => {
                let similar = self.find_similar_functions(name, qualified);
                let mut err = TallyError::undefined_func(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!("Similar: {}", suggestions.join(", ")));
                } else if !qualified && self.get_function(name).is_some() {
                    err = err.with_suggestion(format!("Call it as Math.{}", name));
                }
                Value::Error(err)
            }
        }
    }

    /// Function names similar to the given one, best match first
    fn find_similar_functions(&self, name: &str, qualified: bool) -> Vec<String> {
        let mut matches: Vec<(String, usize)> = self
            .functions
            .iter()
            .filter(|(_, f)| qualified || f.meta().is_helper())
            .filter_map(|(func_name, _)| {
                let score = Self::similarity_score(name, func_name);
                if score > 0 {
                    Some((func_name.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let query = query.to_lowercase();
        if query == candidate {
            return 200;
        }

        let mut score = 0;
        if candidate.starts_with(&query) {
            score += 100;
        } else if candidate.contains(&query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();

        // Require real overlap before suggesting anything
        if score == 0 && common * 2 < candidate.len() {
            return 0;
        }
        score + common * 2
    }

    /// Metadata of all functions, optionally filtered by category, sorted by name
    pub fn list_functions(&self, category: Option<&str>) -> Vec<FunctionMeta> {
        let mut metas: Vec<FunctionMeta> = self
            .functions
            .values()
            .map(|f| f.meta())
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect();
        metas.sort_by(|a, b| a.name.cmp(b.name));
        metas
    }

    pub fn list_constants(&self) -> Vec<ConstantDef> {
        let mut defs: Vec<ConstantDef> = self.constants.values().cloned().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Help for one function or constant, or an overview when `name` is `None`
    pub fn help(&self, name: Option<&str>) -> serde_json::Value {
        match name {
            Some(n) => {
                if let Some(f) = self.get_function(n) {
                    serde_json::to_value(f.meta()).unwrap_or(serde_json::Value::Null)
                } else if let Some(c) = self.get_constant(n) {
                    serde_json::to_value(c).unwrap_or(serde_json::Value::Null)
                } else {
                    serde_json::json!({ "error": format!("Unknown function or constant: {}", n) })
                }
            }
            None => serde_json::json!({
                "helpers": self.list_functions(Some(crate::HELPER_CATEGORY))
                    .iter().map(|m| m.name).collect::<Vec<_>>(),
                "math": self.list_functions(Some(crate::MATH_CATEGORY))
                    .iter().map(|m| m.name).collect::<Vec<_>>(),
                "constants": self.list_constants()
                    .iter().map(|c| c.name.clone()).collect::<Vec<_>>(),
            }),
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
