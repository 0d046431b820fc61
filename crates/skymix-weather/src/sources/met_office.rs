//! Met Office DataHub site-specific hourly forecasts.

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, NaiveDateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use skymix_core::{NetworkError, ReqwestErrorExt};
use tracing::instrument;

use crate::error::SourceError;
use crate::lookup::WeatherDescription;
use crate::provider::WeatherSource;
use crate::types::{Field, GeoLocation, RawObservation, SourceId};

const MET_OFFICE_URL: &str = "https://data.hub.api.metoffice.gov.uk";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

#[derive(Debug, Deserialize)]
struct PointResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Properties {
    #[serde(default)]
    time_series: Vec<TimeStep>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimeStep {
    pub time: String,
    pub screen_temperature: Option<f64>,
    pub feels_like_temperature: Option<f64>,
    #[serde(rename = "windSpeed10m")]
    pub wind_speed_10m: Option<f64>,
    #[serde(rename = "windGustSpeed10m")]
    pub wind_gust_speed_10m: Option<f64>,
    pub prob_of_precipitation: Option<f64>,
    pub total_snow_amount: Option<f64>,
    pub significant_weather_code: Option<Value>,
    pub uv_index: Option<f64>,
    pub screen_relative_humidity: Option<f64>,
}

impl TimeStep {
    fn starts_at(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.time, TIME_FORMAT)
            .ok()
            .map(|t| t.and_utc())
    }

    fn into_observation(self) -> RawObservation {
        let mut obs = RawObservation::new(SourceId::MetOffice);
        obs.set_opt(Field::Temperature, self.screen_temperature);
        obs.set_opt(Field::FeelsLike, self.feels_like_temperature);
        obs.set_opt(Field::WindSpeed, self.wind_speed_10m);
        obs.set_opt(Field::GustSpeed, self.wind_gust_speed_10m);
        obs.set_opt(Field::RainChance, self.prob_of_precipitation);
        obs.set_opt(Field::SnowAmount, self.total_snow_amount);
        obs.set_opt(Field::UvIndex, self.uv_index);
        obs.set_opt(Field::Humidity, self.screen_relative_humidity);
        obs.set_opt(
            Field::Description,
            self.significant_weather_code.as_ref().map(description_label),
        );
        obs
    }
}

/// Map a significant-weather code to its description label. Codes outside
/// the table are passed through verbatim so report assembly rejects them.
fn description_label(code: &Value) -> String {
    let code = match code {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match WeatherDescription::from_significant_weather_code(&code) {
        Ok(description) => description.label().to_string(),
        Err(e) => {
            tracing::error!("Met Office: {}", e);
            code
        }
    }
}

/// The step for the current hour, else the latest one already started.
pub(crate) fn select_time_step(steps: &[TimeStep], now: DateTime<Utc>) -> Option<&TimeStep> {
    let hour = now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now);

    steps
        .iter()
        .find(|s| s.starts_at() == Some(hour))
        .or_else(|| {
            steps
                .iter()
                .filter(|s| s.starts_at().is_some_and(|t| t <= now))
                .max_by_key(|s| s.starts_at())
        })
}

pub struct MetOfficeSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MetOfficeSource {
    pub fn new(client: Client, api_key: &str) -> Self {
        Self::with_base_url(client, MET_OFFICE_URL, api_key)
    }

    pub fn with_base_url(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn payload(reason: impl Into<String>) -> SourceError {
        SourceError::Payload {
            source_id: SourceId::MetOffice,
            reason: reason.into(),
        }
    }

    fn network(error: NetworkError) -> SourceError {
        SourceError::Network {
            source_id: SourceId::MetOffice,
            error,
        }
    }
}

#[async_trait]
impl WeatherSource for MetOfficeSource {
    fn id(&self) -> SourceId {
        SourceId::MetOffice
    }

    #[instrument(skip(self, location), fields(place = %location.display_name()), level = "info")]
    async fn fetch(&self, location: &GeoLocation) -> Result<RawObservation, SourceError> {
        if self.api_key.is_empty() {
            return Err(SourceError::NotConfigured {
                source_id: SourceId::MetOffice,
                reason: "no API key".into(),
            });
        }

        let url = format!("{}/sitespecific/v0/point/hourly", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("accept", "application/json")
            .query(&[
                ("excludeParameterMetadata", "false"),
                ("includeLocationName", "true"),
                ("latitude", location.latitude.as_str()),
                ("longitude", location.longitude.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Self::network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::network(NetworkError::ServerError {
                status: status.as_u16(),
                message: "Met Office API received a bad request".into(),
            }));
        }

        let body: PointResponse = response
            .json()
            .await
            .map_err(|e| Self::payload(e.to_string()))?;

        let steps = body
            .features
            .into_iter()
            .next()
            .map(|f| f.properties.time_series)
            .ok_or_else(|| Self::payload("no features in response"))?;

        let step = select_time_step(&steps, Utc::now())
            .cloned()
            .ok_or_else(|| Self::payload("no time step covers the current hour"))?;

        tracing::debug!("Using Met Office time step {}", step.time);
        Ok(step.into_observation())
    }
}
