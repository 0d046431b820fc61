use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ParseError;

/// Weather providers that can contribute observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    OpenWeather,
    MetOffice,
    BbcWeather,
    YrNo,
    TimeAndDate,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenWeather => write!(f, "OpenWeather"),
            Self::MetOffice => write!(f, "Met Office"),
            Self::BbcWeather => write!(f, "BBC Weather"),
            Self::YrNo => write!(f, "Yr.no"),
            Self::TimeAndDate => write!(f, "timeanddate.com"),
        }
    }
}

/// Field names a provider may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Temperature,
    FeelsLike,
    WindSpeed,
    GustSpeed,
    Humidity,
    RainChance,
    RainAmount,
    SnowAmount,
    Description,
    UvIndex,
    WindDescription,
    Sunrise,
    Sunset,
    MoonPhase,
    MoonPercent,
}

/// A field value exactly as the provider exposed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Text form used for verbatim pass-through fields.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

/// Sparse set of raw fields reported by one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    source: SourceId,
    fields: BTreeMap<Field, RawValue>,
}

impl RawObservation {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<RawValue>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Insert only when the provider actually supplied the value.
    pub fn set_opt(&mut self, field: Field, value: Option<impl Into<RawValue>>) {
        if let Some(v) = value {
            self.fields.insert(field, v.into());
        }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn get(&self, field: Field) -> Option<&RawValue> {
        self.fields.get(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// All observations gathered for one request, at most one per source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    observations: BTreeMap<SourceId, RawObservation>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observation, replacing any earlier one from the same source.
    pub fn insert(&mut self, observation: RawObservation) {
        self.observations.insert(observation.source(), observation);
    }

    pub fn get(&self, source: SourceId) -> Option<&RawObservation> {
        self.observations.get(&source)
    }

    /// Raw value of `field` from `source`, if both exist.
    pub fn field(&self, source: SourceId, field: Field) -> Option<&RawValue> {
        self.get(source).and_then(|obs| obs.get(field))
    }

    pub fn sources(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.observations.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl FromIterator<RawObservation> for ObservationSet {
    fn from_iter<I: IntoIterator<Item = RawObservation>>(iter: I) -> Self {
        let mut set = Self::new();
        for obs in iter {
            set.insert(obs);
        }
        set
    }
}

/// Resolved place the report is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub country_code: String,
    /// Kept as the geocoder's text so it is echoed unchanged.
    pub latitude: String,
    pub longitude: String,
    pub location_id: String,
}

impl GeoLocation {
    /// "Town, CC" as shown at the top of a report.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.country_code)
    }
}

/// A finite number in its metric's canonical unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CanonicalValue(f64);

impl CanonicalValue {
    pub fn new(value: f64) -> Result<Self, ParseError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(ParseError::OutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}
