//! Concurrent collection of raw observations from every configured source.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::error::SourceError;
use crate::types::{GeoLocation, ObservationSet, RawObservation, SourceId};

const USER_AGENT: &str = concat!("skymix/", env!("CARGO_PKG_VERSION"));

/// A provider that can report raw fields for a location.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    fn id(&self) -> SourceId;

    async fn fetch(&self, location: &GeoLocation) -> Result<RawObservation, SourceError>;
}

/// Shared HTTP client for provider requests.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Fans out to every source at once and keeps whatever comes back in time.
#[derive(Clone)]
pub struct ObservationCollector {
    sources: Vec<Arc<dyn WeatherSource>>,
    timeout: Duration,
}

impl ObservationCollector {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sources: Vec::new(),
            timeout,
        }
    }

    pub fn register(&mut self, source: Arc<dyn WeatherSource>) {
        tracing::debug!("Registering source: {}", source.id());
        self.sources.push(source);
    }

    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn WeatherSource>) -> Self {
        self.register(source);
        self
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// Fetch from all sources concurrently.
    ///
    /// Each source runs in its own task under its own timeout. A source
    /// that fails, panics or runs out of time is logged and left out of the
    /// returned set; the others are unaffected.
    pub async fn collect(&self, location: &GeoLocation) -> ObservationSet {
        let mut tasks = JoinSet::new();

        for source in &self.sources {
            let source = Arc::clone(source);
            let location = location.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                let id = source.id();
                let result = match tokio::time::timeout(timeout, source.fetch(&location)).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout {
                        source_id: id,
                        seconds: timeout.as_secs(),
                    }),
                };
                (id, result)
            });
        }

        let mut set = ObservationSet::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(observation))) => {
                    tracing::info!("{} returned {} fields", id, observation.len());
                    set.insert(observation);
                }
                Ok((id, Err(e))) => {
                    tracing::warn!("Leaving {} out of this report: {}", id, e);
                }
                Err(e) => {
                    tracing::error!("Source task failed: {}", e);
                }
            }
        }

        tracing::info!(
            "Collected observations from {} of {} sources",
            set.len(),
            self.sources.len()
        );
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    struct Fixed(RawObservation);

    #[async_trait]
    impl WeatherSource for Fixed {
        fn id(&self) -> SourceId {
            self.0.source()
        }

        async fn fetch(&self, _location: &GeoLocation) -> Result<RawObservation, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct Failing(SourceId);

    #[async_trait]
    impl WeatherSource for Failing {
        fn id(&self) -> SourceId {
            self.0
        }

        async fn fetch(&self, _location: &GeoLocation) -> Result<RawObservation, SourceError> {
            Err(SourceError::Payload {
                source_id: self.0,
                reason: "empty page".into(),
            })
        }
    }

    struct Slow(SourceId);

    #[async_trait]
    impl WeatherSource for Slow {
        fn id(&self) -> SourceId {
            self.0
        }

        async fn fetch(&self, _location: &GeoLocation) -> Result<RawObservation, SourceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(RawObservation::new(self.0))
        }
    }

    fn location() -> GeoLocation {
        GeoLocation {
            name: "Bergen".into(),
            country_code: "NO".into(),
            latitude: "60.39299".into(),
            longitude: "5.32415".into(),
            location_id: "3161732".into(),
        }
    }

    #[tokio::test]
    async fn test_collects_all_sources() {
        let collector = ObservationCollector::new(Duration::from_secs(5))
            .with_source(Arc::new(Fixed(
                RawObservation::new(SourceId::YrNo).with(Field::Temperature, "7°"),
            )))
            .with_source(Arc::new(Fixed(
                RawObservation::new(SourceId::OpenWeather).with(Field::Temperature, 6.5),
            )));

        let set = collector.collect(&location()).await;
        assert_eq!(set.len(), 2);
        assert!(set.field(SourceId::YrNo, Field::Temperature).is_some());
    }

    #[tokio::test]
    async fn test_failed_source_is_absent() {
        let collector = ObservationCollector::new(Duration::from_secs(5))
            .with_source(Arc::new(Failing(SourceId::BbcWeather)))
            .with_source(Arc::new(Fixed(
                RawObservation::new(SourceId::YrNo).with(Field::Temperature, "7"),
            )));

        let set = collector.collect(&location()).await;
        assert_eq!(set.sources().collect::<Vec<_>>(), vec![SourceId::YrNo]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out_without_blocking_others() {
        let collector = ObservationCollector::new(Duration::from_secs(10))
            .with_source(Arc::new(Slow(SourceId::MetOffice)))
            .with_source(Arc::new(Fixed(
                RawObservation::new(SourceId::OpenWeather).with(Field::Humidity, 81.0),
            )));

        let set = collector.collect(&location()).await;
        assert!(set.get(SourceId::MetOffice).is_none());
        assert!(set.get(SourceId::OpenWeather).is_some());
    }

    #[tokio::test]
    async fn test_no_sources_gives_empty_set() {
        let collector = ObservationCollector::new(Duration::from_secs(1));
        assert!(collector.collect(&location()).await.is_empty());
        assert!(collector.source_ids().is_empty());
    }
}
