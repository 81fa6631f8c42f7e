use anyhow::Context;
use chrono::Utc;
use std::time::Duration;

use skycast_app::{FetchOutcome, Orchestrator};
use skycast_commentary::{CommentaryClient, PersonaScope};
use skycast_core::{AppError, CommentaryConfig, Config};
use skycast_weather::{
    acquire_with_timeout, CachePolicy, Coordinate, FixedLocation, ReverseGeocoder, WeatherProvider,
};

const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{e}");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    skycast_core::init()?;

    let config = Config::load()?;
    config.validate()?;

    let coordinate =
        coordinate_from_args().context("Usage: skycast <latitude> <longitude>")?;
    // The CLI stands in for the browser geolocation callback.
    let source = FixedLocation(coordinate);
    let coordinate = acquire_with_timeout(&source, LOCATION_TIMEOUT)
        .await
        .map_err(|e| AppError::Location(e.to_string()))?;

    let provider = WeatherProvider::new().map_err(|e| AppError::Weather(e.to_string()))?;
    let geocoder = ReverseGeocoder::new();
    let commentary = CommentaryClient::new(CommentaryConfig::api_key(), &config.commentary.model)
        .map_err(|e| AppError::Commentary(e.to_string()))?;
    let policy = CachePolicy {
        proximity_km: config.weather.proximity_km,
        freshness: chrono::Duration::minutes(config.weather.freshness_minutes),
    };
    let orchestrator = Orchestrator::with_default_cache(
        provider,
        geocoder,
        commentary,
        &config.config_dir,
        policy,
    );

    let outcome = orchestrator
        .fetch(
            coordinate,
            &config.commentary.language,
            PersonaScope::All,
            Utc::now(),
        )
        .await
        .map_err(|e| AppError::Weather(e.to_string()))?;

    print_outcome(&outcome);
    Ok(())
}

fn coordinate_from_args() -> anyhow::Result<Coordinate> {
    let mut args = std::env::args().skip(1);
    let lat: f64 = args
        .next()
        .context("missing latitude")?
        .parse()
        .context("latitude is not a number")?;
    let lon: f64 = args
        .next()
        .context("missing longitude")?
        .parse()
        .context("longitude is not a number")?;
    Ok(Coordinate::new(lat, lon))
}

fn print_outcome(outcome: &FetchOutcome) {
    let report = outcome.report();
    let snapshot = &report.snapshot;

    println!("{}", report.location_name);
    println!(
        "{}  {}°C (feels like {}°C)",
        snapshot.condition().description(),
        snapshot.temperature,
        snapshot.apparent_temperature
    );
    println!(
        "humidity {}%  wind {} km/h",
        snapshot.humidity, snapshot.wind_speed
    );

    for sample in &snapshot.intraday {
        println!("  {}: {}°C", sample.daypart.label(), sample.temperature);
    }
    if let Some(tomorrow) = &snapshot.tomorrow {
        println!(
            "tomorrow: {} {}..{}°C",
            tomorrow.condition().description(),
            tomorrow.min_temp,
            tomorrow.max_temp
        );
    }

    match outcome {
        FetchOutcome::Complete(report) => {
            if let Some(commentary) = &report.commentary {
                for (persona, entry) in commentary {
                    println!("\n[{persona}] {}", entry.text());
                    if let Some(outfit) = entry.outfit() {
                        println!("  outfit: {outfit}");
                    }
                }
            }
        }
        FetchOutcome::Partial {
            commentary_error, ..
        } => {
            println!("\n(commentary unavailable: {commentary_error})");
        }
    }
}
