//! Conversion contexts and two-hop conversion through the base unit

use serde::Serialize;
use thiserror::Error;

use crate::parse::get_unit_by_id;
use crate::{UnitDefinition, UnitKind};

/// Errors that can occur while binding units into a conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    #[error("cannot convert {from} ({from_kind}) to {to} ({to_kind}): incompatible kinds")]
    IncompatibleKinds {
        from: String,
        to: String,
        from_kind: UnitKind,
        to_kind: UnitKind,
    },

    #[error("slug does not match {{from}}-to-{{to}}: {0}")]
    MalformedSlug(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn flip(self) -> Direction {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// `"forward"` / `"reverse"`, case-insensitive
    pub fn from_tag(tag: &str) -> Option<Direction> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "forward" => Some(Direction::Forward),
            "reverse" => Some(Direction::Reverse),
            _ => None,
        }
    }
}

/// A resolved pair of units of the same kind.
///
/// Only obtainable through [`ConversionContext::new`] and the resolution
/// functions built on it, so `from.kind == to.kind == kind` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionContext {
    from: UnitDefinition,
    to: UnitDefinition,
    kind: UnitKind,
}

impl ConversionContext {
    pub fn new(from: &UnitDefinition, to: &UnitDefinition) -> Result<Self, ConversionError> {
        if from.kind != to.kind {
            return Err(ConversionError::IncompatibleKinds {
                from: from.id.to_string(),
                to: to.id.to_string(),
                from_kind: from.kind,
                to_kind: to.kind,
            });
        }
        Ok(ConversionContext { from: *from, to: *to, kind: from.kind })
    }

    /// Bind two registry ids (exact match)
    pub fn from_ids(from_id: &str, to_id: &str) -> Result<Self, ConversionError> {
        let from = get_unit_by_id(from_id).ok_or_else(|| ConversionError::UnknownUnit(from_id.to_string()))?;
        let to = get_unit_by_id(to_id).ok_or_else(|| ConversionError::UnknownUnit(to_id.to_string()))?;
        Self::new(from, to)
    }

    pub fn from(&self) -> &UnitDefinition {
        &self.from
    }

    pub fn to(&self) -> &UnitDefinition {
        &self.to
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// The same pair with roles swapped
    pub fn swapped(&self) -> ConversionContext {
        ConversionContext { from: self.to, to: self.from, kind: self.kind }
    }
}

/// Convert through the shared base unit. `NaN` passes through untouched.
pub fn convert_value(value: f64, direction: Direction, context: &ConversionContext) -> f64 {
    if value.is_nan() {
        return f64::NAN;
    }
    match direction {
        Direction::Forward => context.to.from_base(context.from.to_base(value)),
        Direction::Reverse => context.from.from_base(context.to.to_base(value)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionTableRow {
    pub input: f64,
    pub output: f64,
}

/// Default table inputs for each direction
pub fn seeds_for(direction: Direction) -> &'static [f64] {
    match direction {
        Direction::Forward => &[1.0, 5.0, 10.0, 25.0, 50.0, 100.0],
        Direction::Reverse => &[1.0, 10.0, 50.0, 100.0, 500.0],
    }
}

pub fn build_conversion_table(
    seeds: &[f64],
    context: &ConversionContext,
    direction: Direction,
) -> Vec<ConversionTableRow> {
    seeds
        .iter()
        .map(|&seed| ConversionTableRow { input: seed, output: convert_value(seed, direction, context) })
        .collect()
}
