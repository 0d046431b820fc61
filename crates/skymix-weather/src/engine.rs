//! Builds a [`WeatherReport`] from whatever observations were collected.
//!
//! The engine is pure: every call works only on its arguments, so one
//! instance can be shared across concurrent requests.

use chrono::{DateTime, Utc};
use skymix_core::MissingMetricPolicy;

use crate::aggregate::{aggregate, format_value, Metric, MetricAggregate, MetricSpec, SourceBinding};
use crate::clean::clean;
use crate::error::{AggregationError, ReportError, UnknownCodeError};
use crate::lookup::{MoonPhase, UvIndex, WeatherDescription};
use crate::report::WeatherReport;
use crate::types::{CanonicalValue, Field, GeoLocation, ObservationSet, SourceId};
use crate::units::{normalize, Unit};

/// The single source trusted for each non-averaged field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAuthorities {
    pub description: SourceId,
    pub uv_index: SourceId,
    pub moon_phase: SourceId,
    pub moon_percent: SourceBinding,
    pub gust_speed: SourceBinding,
    pub rain_amount: SourceBinding,
    pub snow_amount: SourceBinding,
    pub wind_description: SourceId,
    pub sunrise: SourceId,
    pub sunset: SourceId,
}

impl Default for FieldAuthorities {
    fn default() -> Self {
        Self {
            description: SourceId::MetOffice,
            uv_index: SourceId::MetOffice,
            moon_phase: SourceId::TimeAndDate,
            moon_percent: SourceBinding::new(SourceId::TimeAndDate, Unit::Percent),
            gust_speed: SourceBinding::new(SourceId::MetOffice, Unit::Knots),
            rain_amount: SourceBinding::new(SourceId::YrNo, Unit::Millimetres),
            snow_amount: SourceBinding::new(SourceId::MetOffice, Unit::Centimetres),
            wind_description: SourceId::BbcWeather,
            sunrise: SourceId::BbcWeather,
            sunset: SourceId::BbcWeather,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportEngine {
    metrics: Vec<MetricSpec>,
    authorities: FieldAuthorities,
    policy: MissingMetricPolicy,
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new(MetricSpec::reference(), FieldAuthorities::default())
    }
}

impl ReportEngine {
    pub fn new(metrics: Vec<MetricSpec>, authorities: FieldAuthorities) -> Self {
        Self {
            metrics,
            authorities,
            policy: MissingMetricPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: MissingMetricPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MissingMetricPolicy {
        self.policy
    }

    /// Reconcile `observations` into a report for `location`.
    ///
    /// # Errors
    ///
    /// - [`ReportError::NoData`] if no averaged metric got a single value.
    /// - [`ReportError::Aggregation`] if a metric got none and the policy
    ///   is [`MissingMetricPolicy::Fail`].
    /// - [`ReportError::UnknownCode`] if an authoritative source used a
    ///   term outside a lookup vocabulary.
    pub fn build_report(
        &self,
        location: &GeoLocation,
        observations: &ObservationSet,
        generated_at: DateTime<Utc>,
    ) -> Result<WeatherReport, ReportError> {
        let (aggregates, failures) = self.aggregate_metrics(observations);

        if !self.metrics.is_empty() && aggregates.is_empty() {
            tracing::error!(
                "No averaged metric could be produced from {} sources",
                observations.len()
            );
            return Err(ReportError::NoData);
        }

        if let Some(first) = failures.first() {
            match self.policy {
                MissingMetricPolicy::Fail => return Err(first.clone().into()),
                MissingMetricPolicy::Placeholder => {
                    for failure in &failures {
                        tracing::warn!("Reporting {} as unavailable: {}", failure.metric, failure);
                    }
                }
            }
        }

        let formatted = |metric: Metric| {
            aggregates
                .iter()
                .find(|a| a.metric == metric)
                .map(|a| a.formatted.clone())
        };

        let description = self.resolve_description(observations)?;
        let asset = description.asset();
        let uv_index = self.resolve_uv_index(observations)?;
        let moon_phase = self.resolve_moon_phase(observations)?;

        let (snow_condition, snow_amount) = self.snow(observations);

        Ok(WeatherReport {
            generated_at,
            location_name: location.display_name(),
            location_id: location.location_id.clone(),
            latitude: location.latitude.clone(),
            longitude: location.longitude.clone(),
            temperature: formatted(Metric::Temperature),
            feels_like: formatted(Metric::FeelsLike),
            wind_speed: formatted(Metric::WindSpeed),
            rain_chance: formatted(Metric::RainChance),
            humidity: formatted(Metric::Humidity),
            unavailable_metrics: failures.iter().map(|f| f.metric).collect(),
            description,
            weather_emoji: asset.emoji,
            weather_image: asset.image,
            gust_speed: pass_through_number(observations, self.authorities.gust_speed, Field::GustSpeed),
            wind_description: pass_through_text(
                observations,
                self.authorities.wind_description,
                Field::WindDescription,
            ),
            rain_amount: pass_through_number(
                observations,
                self.authorities.rain_amount,
                Field::RainAmount,
            ),
            snow_condition,
            snow_amount,
            uv_index,
            uv_advisory: uv_index.map(UvIndex::advisory),
            sunrise: pass_through_text(observations, self.authorities.sunrise, Field::Sunrise),
            sunset: pass_through_text(observations, self.authorities.sunset, Field::Sunset),
            moon_phase,
            moon_emoji: moon_phase.map(MoonPhase::emoji),
            moon_percent: pass_through_number(
                observations,
                self.authorities.moon_percent,
                Field::MoonPercent,
            ),
            sources: observations.sources().collect(),
        })
    }

    fn aggregate_metrics(
        &self,
        observations: &ObservationSet,
    ) -> (Vec<MetricAggregate>, Vec<AggregationError>) {
        let mut aggregates = Vec::new();
        let mut failures = Vec::new();

        for spec in &self.metrics {
            let contributions = contributions(spec, observations);
            match aggregate(spec.metric, &contributions) {
                Ok(agg) => {
                    tracing::debug!(
                        "{}: {} of {} sources -> {}",
                        spec.metric,
                        agg.contributions.len(),
                        spec.sources.len(),
                        agg.formatted
                    );
                    aggregates.push(agg);
                }
                Err(e) => failures.push(e),
            }
        }

        (aggregates, failures)
    }

    fn resolve_description(
        &self,
        observations: &ObservationSet,
    ) -> Result<WeatherDescription, UnknownCodeError> {
        let source = self.authorities.description;
        let Some(raw) = observations.field(source, Field::Description) else {
            tracing::debug!("{} gave no description", source);
            return Ok(WeatherDescription::NotAvailable);
        };
        WeatherDescription::resolve(&raw.as_text()).map_err(|e| loud(source, e))
    }

    fn resolve_uv_index(
        &self,
        observations: &ObservationSet,
    ) -> Result<Option<UvIndex>, UnknownCodeError> {
        let source = self.authorities.uv_index;
        let Some(raw) = observations.field(source, Field::UvIndex) else {
            return Ok(None);
        };
        let code = clean(raw).map_err(|_| loud(source, UnknownCodeError::new("UV index", raw.as_text())))?;
        UvIndex::resolve(code)
            .map(Some)
            .map_err(|e| loud(source, e))
    }

    fn resolve_moon_phase(
        &self,
        observations: &ObservationSet,
    ) -> Result<Option<MoonPhase>, UnknownCodeError> {
        let source = self.authorities.moon_phase;
        let Some(raw) = observations.field(source, Field::MoonPhase) else {
            return Ok(None);
        };
        MoonPhase::resolve(&raw.as_text())
            .map(Some)
            .map_err(|e| loud(source, e))
    }

    /// Snow flag and formatted amount. A missing amount means no snow.
    fn snow(&self, observations: &ObservationSet) -> (bool, Option<String>) {
        let binding = self.authorities.snow_amount;
        if observations.field(binding.source, Field::SnowAmount).is_none() {
            return (false, Some(format_value(0.0)));
        }
        match canonical_field(observations, binding, Field::SnowAmount) {
            Some(amount) => (amount.value() > 0.0, Some(format_value(amount.value()))),
            None => (false, None),
        }
    }
}

fn loud(source: SourceId, err: UnknownCodeError) -> UnknownCodeError {
    tracing::error!("{} sent a term outside the known vocabulary: {}", source, err);
    err
}

/// Clean and normalize every configured source's value for one metric,
/// skipping sources that are missing or unparseable.
fn contributions(spec: &MetricSpec, observations: &ObservationSet) -> Vec<CanonicalValue> {
    spec.sources
        .iter()
        .filter_map(|binding| canonical_field(observations, *binding, spec.metric.field()))
        .collect()
}

fn canonical_field(
    observations: &ObservationSet,
    binding: SourceBinding,
    field: Field,
) -> Option<CanonicalValue> {
    let raw = observations.field(binding.source, field)?;
    match clean(raw).and_then(|v| normalize(v, binding.unit)) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                "Dropping {:?} from {}: {} ({:?})",
                field,
                binding.source,
                e,
                raw
            );
            None
        }
    }
}

fn pass_through_number(
    observations: &ObservationSet,
    binding: SourceBinding,
    field: Field,
) -> Option<String> {
    canonical_field(observations, binding, field).map(|v| format_value(v.value()))
}

fn pass_through_text(observations: &ObservationSet, source: SourceId, field: Field) -> Option<String> {
    observations
        .field(source, field)
        .map(|raw| raw.as_text().trim().to_string())
        .filter(|s| !s.is_empty())
}
