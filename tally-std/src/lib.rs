//! Tally Standard Library

pub mod constants;
pub mod functions;

use tally_plugin::PluginRegistry;

/// Load standard library into registry
pub fn load_standard_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        // Helpers, callable by bare name
        .with_function(functions::Pow)
        .with_function(functions::Min)
        .with_function(functions::Max)
        .with_function(functions::Abs)
        .with_function(functions::Sqrt)
        .with_function(functions::Log)
        .with_function(functions::Exp)
        // Math.* only
        .with_function(functions::Round)
        .with_function(functions::Floor)
        .with_function(functions::Ceil)
        .with_function(functions::Trunc)
        .with_function(functions::Sign)
        .with_function(functions::Log10)
        .with_function(functions::Log2)
        .with_function(functions::Cbrt)
        .with_function(functions::Hypot)
        .with_function(functions::Sin)
        .with_function(functions::Cos)
        .with_function(functions::Tan)
        .with_function(functions::Atan)
        .with_constant(constants::pi())
        .with_constant(constants::e())
        .with_constant(constants::ln2())
        .with_constant(constants::ln10())
        .with_constant(constants::sqrt2())
}

/// Create registry with standard library
pub fn standard_registry() -> PluginRegistry {
    load_standard_library(PluginRegistry::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_plugin::HELPER_CATEGORY;

    #[test]
    fn test_exactly_seven_bare_helpers() {
        let registry = standard_registry();
        let helpers: Vec<&str> = registry
            .list_functions(Some(HELPER_CATEGORY))
            .iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(helpers, vec!["abs", "exp", "log", "max", "min", "pow", "sqrt"]);
    }

    #[test]
    fn test_math_only_functions_hidden_from_bare_calls() {
        let registry = standard_registry();
        assert!(registry.lookup("round", false).is_none());
        assert!(registry.lookup("round", true).is_some());
        assert!(registry.lookup("sqrt", false).is_some());
    }

    #[test]
    fn test_constants_registered() {
        let registry = standard_registry();
        assert_eq!(registry.get_constant("PI").map(|c| c.value), Some(std::f64::consts::PI));
        assert!(registry.get_constant("pi").is_none());
    }
}
