//! OpenWeather current-weather API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use skymix_core::{NetworkError, ReqwestErrorExt};
use tracing::instrument;

use crate::error::SourceError;
use crate::provider::WeatherSource;
use crate::types::{Field, GeoLocation, RawObservation, SourceId};

const OPENWEATHER_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Default, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    main: MainBlock,
    #[serde(default)]
    wind: WindBlock,
}

#[derive(Debug, Default, Deserialize)]
struct ConditionBlock {
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    /// m/s with `units=metric`
    speed: Option<f64>,
}

pub struct OpenWeatherSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherSource {
    pub fn new(client: Client, api_key: &str) -> Self {
        Self::with_base_url(client, OPENWEATHER_URL, api_key)
    }

    pub fn with_base_url(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn network(&self, error: NetworkError) -> SourceError {
        SourceError::Network {
            source_id: SourceId::OpenWeather,
            error,
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    fn id(&self) -> SourceId {
        SourceId::OpenWeather
    }

    #[instrument(skip(self, location), fields(place = %location.display_name()), level = "info")]
    async fn fetch(&self, location: &GeoLocation) -> Result<RawObservation, SourceError> {
        if self.api_key.is_empty() {
            return Err(SourceError::NotConfigured {
                source_id: SourceId::OpenWeather,
                reason: "no API key".into(),
            });
        }

        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", location.latitude.as_str()),
                ("lon", location.longitude.as_str()),
                ("units", "metric"),
                ("APPID", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.network(NetworkError::ServerError {
                status: status.as_u16(),
                message: "OpenWeather API received a bad request".into(),
            }));
        }

        let body: CurrentResponse = response.json().await.map_err(|e| SourceError::Payload {
            source_id: SourceId::OpenWeather,
            reason: e.to_string(),
        })?;

        let mut obs = RawObservation::new(SourceId::OpenWeather);
        obs.set_opt(Field::Temperature, body.main.temp);
        obs.set_opt(Field::FeelsLike, body.main.feels_like);
        obs.set_opt(Field::Humidity, body.main.humidity);
        obs.set_opt(Field::WindSpeed, body.wind.speed);
        // Free text such as "light rain"; only used if OpenWeather is made
        // the description authority
        obs.set_opt(
            Field::Description,
            body.weather.into_iter().next().and_then(|w| w.description),
        );

        Ok(obs)
    }
}
