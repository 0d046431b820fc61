use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::CanonicalValue;

/// Metres per second to miles per hour.
pub const MS_TO_MPH: f64 = 2.23694;

/// Knots to miles per hour.
pub const KN_TO_MPH: f64 = 1.15078;

/// Units providers report in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Celsius,
    MilesPerHour,
    MetresPerSecond,
    Knots,
    Percent,
    Millimetres,
    Centimetres,
}

impl Unit {
    /// Factor taking a value in this unit to its canonical unit.
    pub fn conversion_factor(self) -> f64 {
        match self {
            Self::MetresPerSecond => MS_TO_MPH,
            Self::Knots => KN_TO_MPH,
            Self::Celsius | Self::MilesPerHour | Self::Percent | Self::Millimetres
            | Self::Centimetres => 1.0,
        }
    }

    /// The unit values end up in after normalization.
    pub fn canonical(self) -> Unit {
        match self {
            Self::MetresPerSecond | Self::Knots | Self::MilesPerHour => Self::MilesPerHour,
            other => other,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::MilesPerHour => "mph",
            Self::MetresPerSecond => "m/s",
            Self::Knots => "kn",
            Self::Percent => "%",
            Self::Millimetres => "mm",
            Self::Centimetres => "cm",
        }
    }
}

/// Convert a cleaned value from `unit` into its canonical unit.
pub fn normalize(value: f64, unit: Unit) -> Result<CanonicalValue, ParseError> {
    CanonicalValue::new(value * unit.conversion_factor())
}
