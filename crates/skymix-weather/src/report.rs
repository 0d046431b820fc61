use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::aggregate::Metric;
use crate::lookup::{MoonPhase, UvIndex, WeatherDescription};
use crate::types::SourceId;

/// Shown wherever a report field could not be produced.
pub const UNAVAILABLE: &str = "N/A";

/// One reconciled weather report.
///
/// Numeric fields are already formatted for display. `None` means no
/// authoritative value was available; nothing is ever filled in with a
/// made-up number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub generated_at: DateTime<Utc>,

    pub location_name: String,
    pub location_id: String,
    pub latitude: String,
    pub longitude: String,

    pub temperature: Option<String>,
    pub feels_like: Option<String>,
    pub wind_speed: Option<String>,
    pub rain_chance: Option<String>,
    pub humidity: Option<String>,
    /// Averaged metrics that no source could supply this time.
    pub unavailable_metrics: Vec<Metric>,

    pub description: WeatherDescription,
    pub weather_emoji: &'static str,
    pub weather_image: &'static str,

    pub gust_speed: Option<String>,
    pub wind_description: Option<String>,
    pub rain_amount: Option<String>,
    pub snow_condition: bool,
    pub snow_amount: Option<String>,

    pub uv_index: Option<UvIndex>,
    pub uv_advisory: Option<&'static str>,

    pub sunrise: Option<String>,
    pub sunset: Option<String>,

    pub moon_phase: Option<MoonPhase>,
    pub moon_emoji: Option<&'static str>,
    pub moon_percent: Option<String>,

    /// Sources that returned anything at all.
    pub sources: Vec<SourceId>,
}

impl WeatherReport {
    /// Formatted value of an averaged metric.
    pub fn metric(&self, metric: Metric) -> Option<&str> {
        let value = match metric {
            Metric::Temperature => &self.temperature,
            Metric::FeelsLike => &self.feels_like,
            Metric::WindSpeed => &self.wind_speed,
            Metric::RainChance => &self.rain_chance,
            Metric::Humidity => &self.humidity,
        };
        value.as_deref()
    }

    /// Generation date as dd/mm/yyyy.
    pub fn current_date(&self) -> String {
        self.generated_at.format("%d/%m/%Y").to_string()
    }

    /// Generation time as HH:MM.
    pub fn current_time(&self) -> String {
        self.generated_at.format("%H:%M").to_string()
    }

    /// True when at least one averaged metric is missing.
    pub fn is_partial(&self) -> bool {
        !self.unavailable_metrics.is_empty()
    }
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNAVAILABLE)
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({}, {}) - {} {} UTC",
            self.location_name,
            self.latitude,
            self.longitude,
            self.current_date(),
            self.current_time()
        )?;
        writeln!(f, "  {}", self.description.label())?;
        writeln!(
            f,
            "  Temperature:   {}°C (feels like {}°C)",
            or_na(&self.temperature),
            or_na(&self.feels_like)
        )?;
        writeln!(
            f,
            "  Wind:          {} mph, gusts {} mph {}",
            or_na(&self.wind_speed),
            or_na(&self.gust_speed),
            self.wind_description.as_deref().unwrap_or("")
        )?;
        writeln!(
            f,
            "  Rain:          {}% chance, {} mm",
            or_na(&self.rain_chance),
            or_na(&self.rain_amount)
        )?;
        if self.snow_condition {
            writeln!(f, "  Snow:          {} cm expected", or_na(&self.snow_amount))?;
        }
        writeln!(f, "  Humidity:      {}%", or_na(&self.humidity))?;
        match (self.uv_index, self.uv_advisory) {
            (Some(uv), Some(advisory)) => writeln!(f, "  UV index:      {} - {}", uv.value(), advisory)?,
            _ => writeln!(f, "  UV index:      {}", UNAVAILABLE)?,
        }
        writeln!(
            f,
            "  Sun:           rises {}, sets {}",
            or_na(&self.sunrise),
            or_na(&self.sunset)
        )?;
        match self.moon_phase {
            Some(phase) => writeln!(
                f,
                "  Moon:          {} ({}% illuminated)",
                phase.name(),
                or_na(&self.moon_percent)
            )?,
            None => writeln!(f, "  Moon:          {}", UNAVAILABLE)?,
        }
        if self.is_partial() {
            let missing: Vec<String> = self
                .unavailable_metrics
                .iter()
                .map(|m| m.to_string())
                .collect();
            writeln!(f, "  Unavailable:   {}", missing.join(", "))?;
        }
        let sources: Vec<String> = self.sources.iter().map(|s| s.to_string()).collect();
        write!(f, "  Sources:       {}", sources.join(", "))
    }
}
