//! Error types for observation processing and provider access.

use skymix_core::{AppError, GeocodeFailure, NetworkError, ReportFailure};
use thiserror::Error;

use crate::aggregate::Metric;
use crate::types::SourceId;

/// A raw field could not be turned into a finite number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty value")]
    Empty,

    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("value is not finite: {0}")]
    OutOfRange(f64),
}

/// A categorical value fell outside its closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {vocabulary} code: {code:?}")]
pub struct UnknownCodeError {
    pub vocabulary: &'static str,
    pub code: String,
}

impl UnknownCodeError {
    pub fn new(vocabulary: &'static str, code: impl Into<String>) -> Self {
        Self {
            vocabulary,
            code: code.into(),
        }
    }
}

/// An averaged metric ended up with no contributions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no source supplied a usable value for {metric}")]
pub struct AggregationError {
    pub metric: Metric,
}

/// Failures surfaced by `ReportEngine::build_report`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    UnknownCode(#[from] UnknownCodeError),

    #[error("every averaged metric is unavailable")]
    NoData,
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        let failure = match &err {
            ReportError::Aggregation(_) => ReportFailure::MetricUnavailable(err.to_string()),
            ReportError::UnknownCode(_) => ReportFailure::Vocabulary(err.to_string()),
            ReportError::NoData => ReportFailure::NoData(err.to_string()),
        };
        AppError::Report(failure)
    }
}

/// Input rejected before any geocoding request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {value:?}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
}

/// Geocoding failures.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no location matches {town:?} in {country_code:?}")]
    NotFound { town: String, country_code: String },

    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl From<GeocodeError> for AppError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::Validation(e) => {
                AppError::Geocode(GeocodeFailure::InvalidInput(e.to_string()))
            }
            e @ GeocodeError::NotFound { .. } => {
                AppError::Geocode(GeocodeFailure::NotFound(e.to_string()))
            }
            GeocodeError::Network(e) => AppError::Network(e),
        }
    }
}

/// One provider could not produce an observation.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_id} is not configured: {reason}")]
    NotConfigured { source_id: SourceId, reason: String },

    #[error("{source_id} request failed: {error}")]
    Network {
        source_id: SourceId,
        #[source]
        error: NetworkError,
    },

    #[error("{source_id} returned an unusable payload: {reason}")]
    Payload { source_id: SourceId, reason: String },

    #[error("{source_id} timed out after {seconds}s")]
    Timeout { source_id: SourceId, seconds: u64 },
}
