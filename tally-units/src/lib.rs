//! Tally Units - Unit Registry and Conversion Engine
//!
//! Every unit carries an affine transform to the base unit of its kind, so
//! any two units of one kind convert in two hops through that base:
//! `to.from_base(from.to_base(x))`.
//!
//! Kinds and their base units:
//! - Length (meter), Weight (kilogram), Volume (liter)
//! - Temperature (kelvin), Area (square meter), Energy (joule)
//! - Time (second), Currency (US dollar), Angle (radian)
//! - Frequency (hertz), Force (newton), Speed (km/h), ...
//! - Power (watt), Pressure (pascal), Data size (byte) and Data rate
//!   (byte per second) convert through a base that is not itself listed

mod convert;
mod formula;
mod kind;
mod parse;
mod unit;
mod units;

pub use convert::{
    build_conversion_table, convert_value, seeds_for, ConversionContext, ConversionError, ConversionTableRow,
    Direction,
};
pub use formula::{
    derive_linear_coefficients, format_formula, format_unit_value, formula_explanation, reverse_formula_explanation,
    LinearCoefficients,
};
pub use kind::UnitKind;
pub use parse::{
    get_unit_by_id, normalize_token, parse_conversion_from_slug, resolve_unit, sanitize_input, try_parse_slug,
};
pub use unit::{Affine, UnitDefinition};
pub use units::{UnitRegistry, UNITS};
