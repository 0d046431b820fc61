pub mod config;
pub mod error;

pub use config::{Config, MissingMetricPolicy, ProvidersConfig, ValidationResult, WeatherConfig};
pub use error::{
    AppError, ConfigError, GeocodeFailure, NetworkError, ReportFailure, ReqwestErrorExt,
};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Skymix core initialized");
    Ok(())
}
