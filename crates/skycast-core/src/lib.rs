//! Core plumbing for Skycast: configuration, error types, tracing init.

pub mod config;
pub mod error;

pub use config::{CommentaryConfig, Config, WeatherConfig};
pub use error::{AppError, ConfigError};

use anyhow::Result;

/// Initialize tracing for the application.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Skycast core initialized");
    Ok(())
}
