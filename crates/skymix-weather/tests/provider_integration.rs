//! Integration tests for the provider clients using wiremock.
//!
//! These tests verify each client against a mock HTTP server.

use chrono::Utc;
use skymix_weather::{
    http_client, Field, GeoLocation, GeoNamesClient, GeocodeError, MetOfficeSource,
    OpenWeatherSource, RawValue, SourceError, WeatherSource,
};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> reqwest::Client {
    http_client(Duration::from_secs(5)).unwrap()
}

fn york() -> GeoLocation {
    GeoLocation {
        name: "York".into(),
        country_code: "GB".into(),
        latitude: "53.95763".into(),
        longitude: "-1.08271".into(),
        location_id: "2633352".into(),
    }
}

#[tokio::test]
async fn test_geonames_search_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/searchJSON"))
        .and(query_param("q", "York"))
        .and(query_param("country", "GB"))
        .and(query_param("featureClass", "P"))
        .and(query_param("username", "demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalResultsCount": 2,
            "geonames": [
                {
                    "name": "York",
                    "countryCode": "GB",
                    "lat": "53.95763",
                    "lng": "-1.08271",
                    "geonameId": 2633352
                },
                {
                    "name": "New York",
                    "countryCode": "GB",
                    "lat": "53.07",
                    "lng": "-0.14",
                    "geonameId": 2641379
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let geocoder = GeoNamesClient::with_base_url(client(), &mock_server.uri(), "demo");
    let location = geocoder.search("York", "GB").await.unwrap();

    assert_eq!(location, york());
    assert_eq!(location.display_name(), "York, GB");
}

#[tokio::test]
async fn test_geonames_no_results_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/searchJSON"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalResultsCount": 0,
            "geonames": []
        })))
        .mount(&mock_server)
        .await;

    let geocoder = GeoNamesClient::with_base_url(client(), &mock_server.uri(), "demo");
    let err = geocoder.search("Atlantis", "GR").await.unwrap_err();

    assert!(matches!(err, GeocodeError::NotFound { .. }));
}

#[tokio::test]
async fn test_geonames_unauthorized_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/searchJSON"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let geocoder = GeoNamesClient::with_base_url(client(), &mock_server.uri(), "nobody");
    let err = geocoder.search("York", "GB").await.unwrap_err();

    assert!(matches!(err, GeocodeError::NotFound { .. }));
}

#[tokio::test]
async fn test_geonames_invalid_input_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let geocoder = GeoNamesClient::with_base_url(client(), &mock_server.uri(), "demo");
    let err = geocoder.search("York; DROP", "GB").await.unwrap_err();

    assert!(matches!(err, GeocodeError::Validation(_)));
}

#[tokio::test]
async fn test_openweather_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .and(query_param("APPID", "key123"))
        .and(query_param("lat", "53.95763"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "weather": [{"id": 500, "main": "Rain", "description": "light rain"}],
            "main": {"temp": 10.2, "feels_like": 8.9, "humidity": 81},
            "wind": {"speed": 4.6, "deg": 230},
            "name": "York"
        })))
        .mount(&mock_server)
        .await;

    let source = OpenWeatherSource::with_base_url(client(), &mock_server.uri(), "key123");
    let obs = source.fetch(&york()).await.unwrap();

    assert_eq!(obs.get(Field::Temperature), Some(&RawValue::Number(10.2)));
    assert_eq!(obs.get(Field::FeelsLike), Some(&RawValue::Number(8.9)));
    assert_eq!(obs.get(Field::Humidity), Some(&RawValue::Number(81.0)));
    // Left in m/s; conversion happens during report assembly
    assert_eq!(obs.get(Field::WindSpeed), Some(&RawValue::Number(4.6)));
    assert_eq!(obs.get(Field::Description), Some(&RawValue::from("light rain")));
    assert!(obs.get(Field::RainChance).is_none());
}

#[tokio::test]
async fn test_openweather_bad_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key"
        })))
        .mount(&mock_server)
        .await;

    let source = OpenWeatherSource::with_base_url(client(), &mock_server.uri(), "wrong");
    let err = source.fetch(&york()).await.unwrap_err();

    assert!(matches!(err, SourceError::Network { .. }));
}

#[tokio::test]
async fn test_met_office_current_step() {
    let mock_server = MockServer::start().await;

    let now = Utc::now();
    let current = now.format("%Y-%m-%dT%H:00Z").to_string();
    let next = (now + chrono::TimeDelta::hours(1))
        .format("%Y-%m-%dT%H:00Z")
        .to_string();

    Mock::given(method("GET"))
        .and(path("/sitespecific/v0/point/hourly"))
        .and(header("apikey", "mo-key"))
        .and(query_param("latitude", "53.95763"))
        .and(query_param("longitude", "-1.08271"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {
                    "location": {"name": "York"},
                    "timeSeries": [
                        {
                            "time": current,
                            "screenTemperature": 9.6,
                            "feelsLikeTemperature": 7.1,
                            "windSpeed10m": 3.2,
                            "windGustSpeed10m": 10.0,
                            "probOfPrecipitation": 45,
                            "significantWeatherCode": 12,
                            "uvIndex": 2,
                            "screenRelativeHumidity": 88.4
                        },
                        {
                            "time": next,
                            "screenTemperature": 30.0,
                            "significantWeatherCode": 1,
                            "uvIndex": 9
                        }
                    ]
                }
            }]
        })))
        .mount(&mock_server)
        .await;

    let source = MetOfficeSource::with_base_url(client(), &mock_server.uri(), "mo-key");
    let obs = source.fetch(&york()).await.unwrap();

    assert_eq!(obs.get(Field::Temperature), Some(&RawValue::Number(9.6)));
    assert_eq!(obs.get(Field::GustSpeed), Some(&RawValue::Number(10.0)));
    assert_eq!(obs.get(Field::RainChance), Some(&RawValue::Number(45.0)));
    assert_eq!(obs.get(Field::Description), Some(&RawValue::from("Light rain")));
    assert_eq!(obs.get(Field::UvIndex), Some(&RawValue::Number(2.0)));
    assert!(obs.get(Field::SnowAmount).is_none());
}

#[tokio::test]
async fn test_met_office_empty_features() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitespecific/v0/point/hourly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "FeatureCollection",
            "features": []
        })))
        .mount(&mock_server)
        .await;

    let source = MetOfficeSource::with_base_url(client(), &mock_server.uri(), "mo-key");
    let err = source.fetch(&york()).await.unwrap_err();

    assert!(matches!(err, SourceError::Payload { .. }));
}
