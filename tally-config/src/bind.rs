//! Consumption-time binding of conversion logic to the unit registry

use tally_units::ConversionContext;

use crate::types::{CalculatorConfig, LogicConfig};

/// Bind a conversion calculator's unit ids to the registry.
///
/// Validation only checks that both ids are present; this checks that they
/// exist (exact, case-sensitive) and share a kind. Non-conversion logic
/// yields `Ok(None)`.
pub fn check_unit_binding(config: &CalculatorConfig, context: &str) -> Result<Option<ConversionContext>, String> {
    let Some(LogicConfig::Conversion(logic)) = &config.logic else {
        return Ok(None);
    };
    ConversionContext::from_ids(&logic.from_unit_id, &logic.to_unit_id)
        .map(Some)
        .map_err(|e| format!("{}: {}", context, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_calculator_config;

    fn config(from: &str, to: &str) -> CalculatorConfig {
        let raw = format!(r#"{{"logic": {{"type": "conversion", "fromUnitId": "{}", "toUnitId": "{}"}}}}"#, from, to);
        parse_calculator_config(&raw, "conv").unwrap()
    }

    #[test]
    fn test_binding_succeeds() {
        let ctx = check_unit_binding(&config("celsius", "fahrenheit"), "conv").unwrap().unwrap();
        assert_eq!(ctx.from().id, "celsius");
        assert_eq!(ctx.to().symbol, "°F");
    }

    #[test]
    fn test_binding_failures() {
        assert_eq!(check_unit_binding(&config("Celsius", "fahrenheit"), "conv"), Err("conv: unknown unit: Celsius".to_string()));
        let err = check_unit_binding(&config("meter", "gram"), "conv").unwrap_err();
        assert!(err.contains("incompatible kinds"));
    }

    #[test]
    fn test_other_logic_is_unbound() {
        assert_eq!(check_unit_binding(&CalculatorConfig::default(), "x"), Ok(None));
    }
}
