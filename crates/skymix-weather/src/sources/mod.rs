//! Clients for providers with structured JSON APIs.
//!
//! Markup-scraped providers (BBC Weather, Yr.no, timeanddate.com) plug in
//! by implementing [`WeatherSource`](crate::provider::WeatherSource) and
//! registering with the collector.

mod met_office;
mod openweather;

pub use met_office::MetOfficeSource;
pub use openweather::OpenWeatherSource;
