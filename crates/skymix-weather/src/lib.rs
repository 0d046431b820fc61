//! Weather reconciliation for Skymix
//!
//! Collects raw observations from several providers, cleans and converts
//! them to canonical units, averages what overlaps and resolves categorical
//! fields into a single [`WeatherReport`].

pub mod aggregate;
pub mod clean;
pub mod engine;
pub mod error;
pub mod geocode;
pub mod lookup;
pub mod provider;
pub mod report;
pub mod sources;
pub mod types;
pub mod units;

pub use aggregate::{aggregate, format_value, Metric, MetricAggregate, MetricSpec, SourceBinding};
pub use clean::clean;
pub use engine::{FieldAuthorities, ReportEngine};
pub use error::{
    AggregationError, GeocodeError, ParseError, ReportError, SourceError, UnknownCodeError,
    ValidationError,
};
pub use geocode::{validate_place_field, GeoNamesClient};
pub use lookup::{DescriptionAsset, MoonPhase, UvIndex, WeatherDescription};
pub use provider::{http_client, ObservationCollector, WeatherSource};
pub use report::WeatherReport;
pub use sources::{MetOfficeSource, OpenWeatherSource};
pub use types::*;
pub use units::{normalize, Unit};
