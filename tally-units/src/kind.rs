//! Unit kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of physical (and quasi-physical) quantities.
///
/// Two units convert into each other only when they share a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Length,
    Weight,
    Volume,
    Temperature,
    Area,
    Illuminance,
    Torque,
    Energy,
    Time,
    Currency,
    Frequency,
    Density,
    Force,
    Voltage,
    Resistance,
    Angle,
    LuminousIntensity,
    Speed,
    Pressure,
    Power,
    DataSize,
    DataRate,
}

impl UnitKind {
    pub const ALL: [UnitKind; 22] = [
        UnitKind::Length,
        UnitKind::Weight,
        UnitKind::Volume,
        UnitKind::Temperature,
        UnitKind::Area,
        UnitKind::Illuminance,
        UnitKind::Torque,
        UnitKind::Energy,
        UnitKind::Time,
        UnitKind::Currency,
        UnitKind::Frequency,
        UnitKind::Density,
        UnitKind::Force,
        UnitKind::Voltage,
        UnitKind::Resistance,
        UnitKind::Angle,
        UnitKind::LuminousIntensity,
        UnitKind::Speed,
        UnitKind::Pressure,
        UnitKind::Power,
        UnitKind::DataSize,
        UnitKind::DataRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Length => "length",
            UnitKind::Weight => "weight",
            UnitKind::Volume => "volume",
            UnitKind::Temperature => "temperature",
            UnitKind::Area => "area",
            UnitKind::Illuminance => "illuminance",
            UnitKind::Torque => "torque",
            UnitKind::Energy => "energy",
            UnitKind::Time => "time",
            UnitKind::Currency => "currency",
            UnitKind::Frequency => "frequency",
            UnitKind::Density => "density",
            UnitKind::Force => "force",
            UnitKind::Voltage => "voltage",
            UnitKind::Resistance => "resistance",
            UnitKind::Angle => "angle",
            UnitKind::LuminousIntensity => "luminous_intensity",
            UnitKind::Speed => "speed",
            UnitKind::Pressure => "pressure",
            UnitKind::Power => "power",
            UnitKind::DataSize => "data_size",
            UnitKind::DataRate => "data_rate",
        }
    }

    /// Parse the snake_case tag
    pub fn from_tag(tag: &str) -> Option<UnitKind> {
        Self::ALL.iter().copied().find(|k| k.as_str() == tag)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
