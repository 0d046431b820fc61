use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variables that override credentials from the config file.
pub const ENV_GEONAMES_USERNAME: &str = "GEONAMES_USERNAME";
pub const ENV_OPENWEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_MET_OFFICE_API_KEY: &str = "MET_OFFICE_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Provider endpoints and credentials
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Report assembly settings
    #[serde(default)]
    pub weather: WeatherConfig,
}

/// What to do when an averaged metric ends up with no contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingMetricPolicy {
    /// Leave the metric out of the report and list it as unavailable.
    #[default]
    Placeholder,
    /// Fail the whole report.
    Fail,
}

impl std::str::FromStr for MissingMetricPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "placeholder" => Ok(Self::Placeholder),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown missing-metric policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Per-source fetch timeout in seconds
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,

    /// Policy for averaged metrics that no source could supply
    #[serde(default)]
    pub missing_metric_policy: MissingMetricPolicy,
}

fn default_source_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: default_source_timeout_secs(),
            missing_metric_policy: MissingMetricPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub geonames_url: String,
    pub geonames_username: String,
    pub openweather_url: String,
    pub openweather_api_key: String,
    pub met_office_url: String,
    pub met_office_api_key: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            geonames_url: "http://api.geonames.org".to_string(),
            geonames_username: String::new(),
            openweather_url: "https://api.openweathermap.org".to_string(),
            openweather_api_key: String::new(),
            met_office_url: "https://data.hub.api.metoffice.gov.uk".to_string(),
            met_office_api_key: String::new(),
        }
    }
}

impl ProvidersConfig {
    /// Replace credentials with values from the environment, when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var(ENV_GEONAMES_USERNAME) {
            self.geonames_username = v;
        }
        if let Ok(v) = std::env::var(ENV_OPENWEATHER_API_KEY) {
            self.openweather_api_key = v;
        }
        if let Ok(v) = std::env::var(ENV_MET_OFFICE_API_KEY) {
            self.met_office_api_key = v;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skymix");

        Self {
            config_dir,
            providers: ProvidersConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist.
    ///
    /// Credentials from the environment (or a `.env` file) take precedence
    /// over the file.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;

        // A missing .env file is normal
        let _ = dotenvy::dotenv();
        config.providers.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from an explicit path, writing defaults there if
    /// the file doesn't exist yet.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)?;

        toml::from_str(&contents).map_err(|e| {
            ConfigError::ParseError(format!("{}: {}", config_path.display(), e.message()))
        })
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        Self::load()?.into_validated()
    }

    fn into_validated(self) -> Result<(Self, ValidationResult), ConfigError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((self, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.providers.geonames_url,
            "providers.geonames_url",
            &mut result,
        );
        self.validate_url(
            &self.providers.openweather_url,
            "providers.openweather_url",
            &mut result,
        );
        self.validate_url(
            &self.providers.met_office_url,
            "providers.met_office_url",
            &mut result,
        );

        if self.weather.source_timeout_secs == 0 {
            result.add_error(
                "weather.source_timeout_secs",
                "Source timeout must be greater than 0",
            );
        } else if self.weather.source_timeout_secs > 120 {
            result.add_warning(
                "weather.source_timeout_secs",
                "Source timeout is unusually long (>120 seconds)",
            );
        }

        if self.providers.geonames_username.is_empty() {
            result.add_warning(
                "providers.geonames_username",
                "GeoNames username not configured - place lookups will be rejected",
            );
        }
        if self.providers.openweather_api_key.is_empty() {
            result.add_warning(
                "providers.openweather_api_key",
                "OpenWeather API key not configured - source will be skipped",
            );
        }
        if self.providers.met_office_api_key.is_empty() {
            result.add_warning(
                "providers.met_office_api_key",
                "Met Office API key not configured - source will be skipped",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        std::fs::write(config_path, contents)?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::MissingSetting("user config directory".to_string()))?
            .join("skymix");

        Ok(config_dir.join("config.toml"))
    }
}
