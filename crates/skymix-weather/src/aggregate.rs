//! Averaging of per-source values and the shared numeric display format.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AggregationError;
use crate::types::{CanonicalValue, Field, SourceId};
use crate::units::Unit;

/// Metrics averaged across sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    FeelsLike,
    WindSpeed,
    RainChance,
    Humidity,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Self::Temperature,
        Self::FeelsLike,
        Self::WindSpeed,
        Self::RainChance,
        Self::Humidity,
    ];

    /// Raw field each source reports this metric under.
    pub fn field(self) -> Field {
        match self {
            Self::Temperature => Field::Temperature,
            Self::FeelsLike => Field::FeelsLike,
            Self::WindSpeed => Field::WindSpeed,
            Self::RainChance => Field::RainChance,
            Self::Humidity => Field::Humidity,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::FeelsLike => write!(f, "feels-like temperature"),
            Self::WindSpeed => write!(f, "wind speed"),
            Self::RainChance => write!(f, "rain chance"),
            Self::Humidity => write!(f, "humidity"),
        }
    }
}

/// One source expected to contribute a metric, in its native unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBinding {
    pub source: SourceId,
    pub unit: Unit,
}

impl SourceBinding {
    pub const fn new(source: SourceId, unit: Unit) -> Self {
        Self { source, unit }
    }
}

/// Which sources feed a metric and how their values convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub metric: Metric,
    pub sources: Vec<SourceBinding>,
}

impl MetricSpec {
    pub fn new(metric: Metric, sources: Vec<SourceBinding>) -> Self {
        Self { metric, sources }
    }

    /// Bindings used by the reference deployment.
    pub fn reference() -> Vec<MetricSpec> {
        use SourceId::*;
        use Unit::*;

        let b = SourceBinding::new;
        vec![
            Self::new(
                Metric::Temperature,
                vec![
                    b(OpenWeather, Celsius),
                    b(MetOffice, Celsius),
                    b(BbcWeather, Celsius),
                    b(YrNo, Celsius),
                ],
            ),
            Self::new(
                Metric::FeelsLike,
                vec![
                    b(OpenWeather, Celsius),
                    b(MetOffice, Celsius),
                    b(BbcWeather, Celsius),
                    b(YrNo, Celsius),
                ],
            ),
            Self::new(
                Metric::WindSpeed,
                vec![
                    b(OpenWeather, MetresPerSecond),
                    b(MetOffice, MilesPerHour),
                    b(BbcWeather, MilesPerHour),
                    b(YrNo, MetresPerSecond),
                ],
            ),
            Self::new(
                Metric::RainChance,
                vec![b(MetOffice, Percent), b(BbcWeather, Percent)],
            ),
            Self::new(
                Metric::Humidity,
                vec![
                    b(OpenWeather, Percent),
                    b(MetOffice, Percent),
                    b(BbcWeather, Percent),
                ],
            ),
        ]
    }
}

/// The values one metric received this run and their mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAggregate {
    pub metric: Metric,
    pub contributions: Vec<CanonicalValue>,
    pub mean: f64,
    pub formatted: String,
}

/// Average whatever contributions arrived for `metric`.
///
/// Sources that could not supply the metric are simply absent from
/// `contributions`; they are never counted as zero.
pub fn aggregate(
    metric: Metric,
    contributions: &[CanonicalValue],
) -> Result<MetricAggregate, AggregationError> {
    if contributions.is_empty() {
        return Err(AggregationError { metric });
    }

    let count = contributions.len() as f64;
    let sum: f64 = contributions.iter().map(|c| c.value()).sum();
    let mut mean = sum / count;
    if !mean.is_finite() {
        // The sum overflowed; every term is finite so scaled terms are too
        mean = contributions.iter().map(|c| c.value() / count).sum();
    }

    Ok(MetricAggregate {
        metric,
        contributions: contributions.to_vec(),
        mean,
        formatted: format_value(mean),
    })
}

/// Display format for every number in a report: one decimal place, with
/// the decimal point dropped when the rounded value is whole.
///
/// Rounding works on the exact binary value with ties to even, so `10.25`
/// becomes `"10.2"` and `0.35` (stored just below) becomes `"0.3"`.
pub fn format_value(value: f64) -> String {
    let formatted = format!("{:.1}", value);
    match formatted.strip_suffix(".0") {
        Some("-0") => "0".to_string(),
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}
