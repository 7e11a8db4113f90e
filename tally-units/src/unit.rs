//! Unit definitions and their base-unit transforms

use crate::UnitKind;
use serde::Serialize;

/// Invertible affine map between a unit and its kind's base unit.
///
/// `to_base(x) = ((x + shift) * numerator) / denominator + offset`
/// `from_base` applies the exact inverse operations in reverse order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub shift: f64,
    pub numerator: f64,
    pub denominator: f64,
    pub offset: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine { shift: 0.0, numerator: 1.0, denominator: 1.0, offset: 0.0 };

    pub const fn new(shift: f64, numerator: f64, denominator: f64, offset: f64) -> Self {
        Affine { shift, numerator, denominator, offset }
    }

    /// `x * factor`
    pub const fn scale(factor: f64) -> Self {
        Affine::new(0.0, factor, 1.0, 0.0)
    }

    /// `x / divisor`
    pub const fn divide(divisor: f64) -> Self {
        Affine::new(0.0, 1.0, divisor, 0.0)
    }

    /// `x + offset`
    pub const fn offset(offset: f64) -> Self {
        Affine::new(0.0, 1.0, 1.0, offset)
    }

    pub fn to_base(&self, value: f64) -> f64 {
        ((value + self.shift) * self.numerator) / self.denominator + self.offset
    }

    pub fn from_base(&self, value: f64) -> f64 {
        ((value - self.offset) * self.denominator) / self.numerator - self.shift
    }
}

/// A convertible unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDefinition {
    /// Stable identifier (e.g. "square_foot")
    pub id: &'static str,
    pub label: &'static str,
    pub symbol: &'static str,
    pub kind: UnitKind,
    #[serde(skip)]
    pub transform: Affine,
    /// Fraction digits used when displaying a value in this unit
    pub decimal_places: usize,
}

impl UnitDefinition {
    pub const fn new(
        id: &'static str,
        label: &'static str,
        symbol: &'static str,
        kind: UnitKind,
        transform: Affine,
        decimal_places: usize,
    ) -> Self {
        UnitDefinition { id, label, symbol, kind, transform, decimal_places }
    }

    pub fn to_base(&self, value: f64) -> f64 {
        self.transform.to_base(value)
    }

    pub fn from_base(&self, value: f64) -> f64 {
        self.transform.from_base(value)
    }

    /// True for the reference unit of its kind
    pub fn is_base(&self) -> bool {
        self.transform == Affine::IDENTITY
    }

    pub fn is_compatible(&self, other: &UnitDefinition) -> bool {
        self.kind == other.kind
    }
}
