//! Human-readable conversion formulas

use serde::Serialize;
use tally_core::{format_grouped, format_locale, UNAVAILABLE};

use crate::convert::{convert_value, ConversionContext, Direction};
use crate::UnitDefinition;

const FORMULA_DIGITS: usize = 8;

const SWAP_ONLY: &str = "Yes. Hit the swap button in the converter to reverse the calculation.";

/// `output = input * slope + intercept` for a forward conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearCoefficients {
    pub slope: f64,
    pub intercept: f64,
}

/// Sample the forward conversion at 0 and 1. Float noise is snapped to zero.
pub fn derive_linear_coefficients(context: &ConversionContext) -> LinearCoefficients {
    let at_zero = convert_value(0.0, Direction::Forward, context);
    let at_one = convert_value(1.0, Direction::Forward, context);

    let slope = at_one - at_zero;
    LinearCoefficients {
        slope: if slope.abs() < 1e-12 { 0.0 } else { slope },
        intercept: if at_zero.abs() < 1e-9 { 0.0 } else { at_zero },
    }
}

fn num(value: f64) -> String {
    format_grouped(value, FORMULA_DIGITS)
}

/// `"ft = (m × 3.2808399)"`, or with an intercept `"°F = (°C × 1.8) + 32"`
pub fn format_formula(context: &ConversionContext) -> String {
    let LinearCoefficients { slope, intercept } = derive_linear_coefficients(context);
    let base = format!("{} = ({} × {})", context.to().symbol, context.from().symbol, num(slope));
    if intercept == 0.0 {
        return base;
    }
    let operator = if intercept >= 0.0 { "+" } else { "-" };
    format!("{} {} {}", base, operator, num(intercept.abs()))
}

pub fn formula_explanation(context: &ConversionContext) -> String {
    let LinearCoefficients { slope, intercept } = derive_linear_coefficients(context);
    let from = context.from().label.to_lowercase();
    let to = context.to().label.to_lowercase();

    if intercept == 0.0 {
        return format!(
            "Multiply your value in {} by {} to obtain the equivalent in {}.",
            from,
            num(slope),
            to
        );
    }

    let verb = if intercept >= 0.0 { "add" } else { "subtract" };
    format!(
        "Multiply your {} value by {}, then {} {} to reach {}.",
        from,
        num(slope),
        verb,
        num(intercept.abs()),
        to
    )
}

/// Answer to "can I convert the other way?"
///
/// The factor back is sampled from the swapped pair, so a forward slope
/// snapped to zero never turns into an infinite factor.
pub fn reverse_formula_explanation(context: &ConversionContext) -> String {
    let LinearCoefficients { slope, intercept } = derive_linear_coefficients(context);
    let to = context.to().label.to_lowercase();

    if intercept == 0.0 {
        let back = derive_linear_coefficients(&context.swapped()).slope;
        if back == 0.0 || !back.is_finite() {
            return SWAP_ONLY.to_string();
        }
        return format!(
            "Yes. Hit the swap button in the converter to reverse the calculation or multiply your {} value by {} to switch back.",
            to,
            num(back)
        );
    }
    if slope == 0.0 {
        return SWAP_ONLY.to_string();
    }

    let verb = if intercept >= 0.0 { "subtract" } else { "add" };
    format!(
        "Yes. Swap the converter direction or {} {} from your {} value, then divide the result by {}.",
        verb,
        num(intercept.abs()),
        to,
        num(slope)
    )
}

/// Render with the unit's decimal places; `—` when not finite
pub fn format_unit_value(value: f64, unit: &UnitDefinition) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }
    format_locale(value, 0, unit.decimal_places)
}
