//! Forward geocoding: turn a town and country code into coordinates.
//! Uses the GeoNames search API (free account username required).

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use skymix_core::{NetworkError, ReqwestErrorExt};
use tracing::instrument;

use crate::error::{GeocodeError, ValidationError};
use crate::types::GeoLocation;

const GEONAMES_URL: &str = "http://api.geonames.org";
const MAX_FIELD_CHARS: usize = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    total_results_count: u64,
    #[serde(default)]
    geonames: Vec<GeoName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoName {
    name: String,
    country_code: String,
    lat: String,
    lng: String,
    geoname_id: u64,
}

/// Check a form field before it is sent anywhere.
///
/// Spaces are ignored; what remains must be 2 to 30 letters.
pub fn validate_place_field(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let compact: String = value.chars().filter(|c| *c != ' ').collect();
    let len = compact.chars().count();

    if len > 1 && len <= MAX_FIELD_CHARS && compact.chars().all(char::is_alphabetic) {
        Ok(())
    } else {
        Err(ValidationError {
            field,
            value: value.to_string(),
        })
    }
}

pub struct GeoNamesClient {
    client: Client,
    base_url: String,
    username: String,
}

impl GeoNamesClient {
    pub fn new(client: Client, username: &str) -> Self {
        Self::with_base_url(client, GEONAMES_URL, username)
    }

    pub fn with_base_url(client: Client, base_url: &str, username: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
        }
    }

    /// Look up the best populated-place match for `town` in `country_code`.
    ///
    /// # Errors
    ///
    /// [`GeocodeError::Validation`] for malformed input (no request is
    /// made), [`GeocodeError::NotFound`] when GeoNames has no match or
    /// rejects the account, [`GeocodeError::Network`] otherwise.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, town: &str, country_code: &str) -> Result<GeoLocation, GeocodeError> {
        validate_place_field("town", town)?;
        validate_place_field("country code", country_code)?;

        let not_found = || GeocodeError::NotFound {
            town: town.to_string(),
            country_code: country_code.to_string(),
        };

        let url = format!("{}/searchJSON", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", town),
                ("country", country_code),
                ("featureClass", "P"),
                ("fuzzy", "0.6"),
                ("username", self.username.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("GeoNames rejected the configured username");
            return Err(not_found());
        }
        if !status.is_success() {
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message: format!("GeoNames search returned {}", status),
            }
            .into());
        }

        let body: SearchResponse = response.json().await.map_err(|e| e.into_network_error())?;

        if body.total_results_count == 0 {
            tracing::info!("No GeoNames match for {}, {}", town, country_code);
            return Err(not_found());
        }

        let first = body.geonames.into_iter().next().ok_or_else(not_found)?;

        let location = GeoLocation {
            name: first.name,
            country_code: first.country_code,
            latitude: first.lat,
            longitude: first.lng,
            location_id: first.geoname_id.to_string(),
        };

        tracing::info!("Geocoded to: {}", location.display_name());
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_place_fields() {
        assert!(validate_place_field("town", "York").is_ok());
        assert!(validate_place_field("town", "Milton Keynes").is_ok());
        assert!(validate_place_field("town", "Zürich").is_ok());
        assert!(validate_place_field("country code", "GB").is_ok());
    }

    #[test]
    fn test_invalid_place_fields() {
        assert!(validate_place_field("town", "").is_err());
        assert!(validate_place_field("town", "Y").is_err());
        assert!(validate_place_field("town", "York1").is_err());
        assert!(validate_place_field("town", "Stoke-on-Trent").is_err());
        assert!(validate_place_field("town", &"a".repeat(31)).is_err());
        let err = validate_place_field("country code", "G B!").unwrap_err();
        assert_eq!(err.field, "country code");
    }

    #[test]
    fn test_search_response_tolerates_error_payload() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"status":{"message":"user does not exist.","value":10}}"#,
        )
        .unwrap();
        assert_eq!(body.total_results_count, 0);
        assert!(body.geonames.is_empty());
    }
}
