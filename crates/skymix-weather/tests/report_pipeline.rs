//! End-to-end: concurrent collection feeding report assembly.

use async_trait::async_trait;
use chrono::Utc;
use skymix_core::MissingMetricPolicy;
use skymix_weather::{
    http_client, Field, GeoLocation, MetOfficeSource, Metric, ObservationCollector,
    OpenWeatherSource, RawObservation, ReportEngine, ReportError, SourceError, SourceId,
    WeatherDescription, WeatherSource,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stands in for a markup-scraped provider.
struct Scraped(RawObservation);

#[async_trait]
impl WeatherSource for Scraped {
    fn id(&self) -> SourceId {
        self.0.source()
    }

    async fn fetch(&self, _location: &GeoLocation) -> Result<RawObservation, SourceError> {
        Ok(self.0.clone())
    }
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

async fn mount_openweather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": {"temp": 10, "feels_like": 8, "humidity": 80},
            "wind": {"speed": 5.0}
        })))
        .mount(server)
        .await;
}

async fn mount_met_office_outage(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sitespecific/v0/point/hourly"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server)
        .await;
}

fn bbc() -> Arc<dyn WeatherSource> {
    Arc::new(Scraped(
        RawObservation::new(SourceId::BbcWeather)
            .with(Field::Temperature, "12°")
            .with(Field::FeelsLike, "11°")
            .with(Field::WindSpeed, "9")
            .with(Field::RainChance, "20% ")
            .with(Field::Humidity, "70%")
            .with(Field::WindDescription, "Westerly")
            .with(Field::Sunrise, "06:30")
            .with(Field::Sunset, "18:02"),
    ))
}

fn yr() -> Arc<dyn WeatherSource> {
    Arc::new(Scraped(
        RawObservation::new(SourceId::YrNo)
            .with(Field::Temperature, "11")
            .with(Field::FeelsLike, "9")
            .with(Field::WindSpeed, "4")
            .with(Field::RainAmount, "1.2"),
    ))
}

#[tokio::test]
async fn test_report_survives_provider_outage() {
    let server = MockServer::start().await;
    mount_openweather(&server).await;
    mount_met_office_outage(&server).await;

    let client = http_client(Duration::from_secs(5)).unwrap();
    let collector = ObservationCollector::new(Duration::from_secs(5))
        .with_source(Arc::new(OpenWeatherSource::with_base_url(
            client.clone(),
            &server.uri(),
            "ow-key",
        )))
        .with_source(Arc::new(MetOfficeSource::with_base_url(
            client,
            &server.uri(),
            "mo-key",
        )))
        .with_source(bbc())
        .with_source(yr());

    let observations = collector.collect(&york()).await;
    assert!(observations.get(SourceId::MetOffice).is_none());
    assert_eq!(observations.len(), 3);

    let report = ReportEngine::default()
        .build_report(&york(), &observations, Utc::now())
        .unwrap();

    // (10 + 12 + 11) / 3
    assert_eq!(report.temperature.as_deref(), Some("11"));
    // (8 + 11 + 9) / 3
    assert_eq!(report.feels_like.as_deref(), Some("9.3"));
    // (11.1847 + 9 + 8.94776) / 3
    assert_eq!(report.wind_speed.as_deref(), Some("9.7"));
    assert_eq!(report.rain_chance.as_deref(), Some("20"));
    assert_eq!(report.humidity.as_deref(), Some("75"));
    assert!(!report.is_partial());

    // Met Office was authoritative for these
    assert_eq!(report.description, WeatherDescription::NotAvailable);
    assert!(report.gust_speed.is_none());
    assert!(report.uv_index.is_none());

    assert_eq!(report.rain_amount.as_deref(), Some("1.2"));
    assert_eq!(report.sunset.as_deref(), Some("18:02"));
    assert_eq!(report.location_name, "York, GB");
}

#[tokio::test]
async fn test_fail_policy_rejects_partial_report() {
    let collector = ObservationCollector::new(Duration::from_secs(5)).with_source(yr());

    let observations = collector.collect(&york()).await;
    let err = ReportEngine::default()
        .with_policy(MissingMetricPolicy::Fail)
        .build_report(&york(), &observations, Utc::now())
        .unwrap_err();

    assert!(matches!(err, ReportError::Aggregation(ref e) if e.metric == Metric::RainChance));
}

#[tokio::test]
async fn test_all_sources_down_is_no_data() {
    let server = MockServer::start().await;
    mount_met_office_outage(&server).await;

    let client = http_client(Duration::from_secs(5)).unwrap();
    let collector = ObservationCollector::new(Duration::from_secs(5)).with_source(Arc::new(
        MetOfficeSource::with_base_url(client, &server.uri(), "mo-key"),
    ));

    let observations = collector.collect(&york()).await;
    assert!(observations.is_empty());

    let err = ReportEngine::default()
        .build_report(&york(), &observations, Utc::now())
        .unwrap_err();
    assert_eq!(err, ReportError::NoData);
}
