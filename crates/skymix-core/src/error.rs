//! Centralized error types for the Skymix application.
//!
//! This module provides a typed error hierarchy that:
//! - Separates network, configuration and reporting failures
//! - Provides user-friendly messages suitable for terminal display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message fit for the person who asked for
/// the report.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeFailure),

    #[error("Report error: {0}")]
    Report(#[from] ReportFailure),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Geocode(e) => e.user_message(),
            AppError::Report(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// True when no report could be produced at all, as opposed to an
    /// infrastructure failure.
    pub fn is_no_report(&self) -> bool {
        matches!(self, AppError::Geocode(_) | AppError::Report(_))
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
            ConfigError::Io(_) => "The configuration file could not be read or written.",
        }
    }
}

/// Why a place could not be turned into coordinates.
#[derive(Debug, Error)]
pub enum GeocodeFailure {
    #[error("Invalid place input: {0}")]
    InvalidInput(String),

    #[error("No matching location: {0}")]
    NotFound(String),
}

impl GeocodeFailure {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeocodeFailure::InvalidInput(_) => {
                "Town and country code must be letters only (2 to 30 characters)."
            }
            GeocodeFailure::NotFound(_) => "Location not found. Check the spelling and try again.",
        }
    }
}

/// Why a weather report could not be produced from collected observations.
#[derive(Debug, Error)]
pub enum ReportFailure {
    #[error("No weather data available: {0}")]
    NoData(String),

    #[error("Metric unavailable: {0}")]
    MetricUnavailable(String),

    #[error("Unrecognized provider vocabulary: {0}")]
    Vocabulary(String),
}

impl ReportFailure {
    pub fn user_message(&self) -> &'static str {
        match self {
            ReportFailure::NoData(_) => {
                "Could not produce a weather report. No provider returned usable data."
            }
            ReportFailure::MetricUnavailable(_) => {
                "Could not produce a complete weather report. Please try again later."
            }
            ReportFailure::Vocabulary(_) => {
                "A weather provider returned data this version cannot interpret."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Network(NetworkError::Timeout),
            AppError::Config(ConfigError::Invalid("test".into())),
            AppError::Geocode(GeocodeFailure::NotFound("Nowhere".into())),
            AppError::Report(ReportFailure::NoData("all sources failed".into())),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "empty message for {err}");
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let failure = GeocodeFailure::NotFound("Atlantis".into());
        let app_err: AppError = failure.into();
        assert!(matches!(app_err, AppError::Geocode(GeocodeFailure::NotFound(_))));
    }

    #[test]
    fn test_config_failures_keep_their_message() {
        let parse: AppError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(parse, AppError::Config(ConfigError::ParseError(_))));
        assert_eq!(
            parse.user_message(),
            "Configuration file is malformed. Check your settings."
        );
        assert!(!parse.is_no_report());
    }

    #[test]
    fn test_no_report_outcome_is_distinguishable() {
        assert!(AppError::Report(ReportFailure::NoData("x".into())).is_no_report());
        assert!(AppError::Geocode(GeocodeFailure::InvalidInput("x".into())).is_no_report());
        assert!(!AppError::Network(NetworkError::Timeout).is_no_report());
    }

    #[test]
    fn test_server_error_message_depends_on_status() {
        let upstream = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        let client = NetworkError::ServerError {
            status: 404,
            message: "missing".into(),
        };
        assert_ne!(upstream.user_message(), client.user_message());
    }
}
