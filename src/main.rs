use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use skymix_core::{AppError, Config, MissingMetricPolicy, ReqwestErrorExt};
use skymix_weather::{
    http_client, GeoNamesClient, MetOfficeSource, ObservationCollector, OpenWeatherSource,
    ReportEngine,
};

#[derive(Parser)]
#[command(name = "skymix")]
#[command(about = "Reconciled current weather from several providers", long_about = None)]
struct Cli {
    /// Town or city name
    town: String,

    /// Two-letter country code, e.g. GB
    country_code: String,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// What to do when a metric has no data: placeholder or fail
    #[arg(long)]
    policy: Option<MissingMetricPolicy>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = skymix_core::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            if e.is_no_report() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let (config, _) = Config::load_validated()?;

    let timeout = Duration::from_secs(config.weather.source_timeout_secs);
    let client = http_client(timeout).map_err(|e| e.into_network_error())?;
    let providers = &config.providers;

    let geocoder = GeoNamesClient::with_base_url(
        client.clone(),
        &providers.geonames_url,
        &providers.geonames_username,
    );
    let location = geocoder.search(&cli.town, &cli.country_code).await?;

    let mut collector = ObservationCollector::new(timeout);
    if !providers.openweather_api_key.is_empty() {
        collector.register(Arc::new(OpenWeatherSource::with_base_url(
            client.clone(),
            &providers.openweather_url,
            &providers.openweather_api_key,
        )));
    }
    if !providers.met_office_api_key.is_empty() {
        collector.register(Arc::new(MetOfficeSource::with_base_url(
            client,
            &providers.met_office_url,
            &providers.met_office_api_key,
        )));
    }

    let observations = collector.collect(&location).await;

    let policy = cli.policy.unwrap_or(config.weather.missing_metric_policy);
    let report = ReportEngine::default()
        .with_policy(policy)
        .build_report(&location, &observations, Utc::now())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
        println!("{}", json);
    } else {
        println!("{}", report);
    }

    tracing::info!(
        "Report for {} built from {} sources",
        report.location_name,
        report.sources.len()
    );
    Ok(())
}
