//! Centralized error types for the Skycast application.
//!
//! Service crates keep their own typed errors (`WeatherError`,
//! `LocationError`, `CommentaryError`); everything converges here at the
//! UI boundary, where `user_message()` produces a display-safe string.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Location error: {0}")]
    Location(String),

    #[error("Weather service error: {0}")]
    Weather(String),

    #[error("Commentary error: {0}")]
    Commentary(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Location(_) => {
                "Couldn't determine your location. Check location permissions and try again."
            }
            AppError::Weather(_) => {
                "Couldn't load the weather right now. Check your connection and try again."
            }
            AppError::Commentary(_) => {
                "The weather is shown, but the commentary couldn't be generated."
            }
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration file is missing.",
            ConfigError::Invalid(_) => "Configuration is invalid. Check the settings file.",
            ConfigError::MissingSetting(_) => "A required setting is missing.",
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: AppError = ConfigError::MissingSetting("commentary.model".to_string()).into();
        assert!(matches!(err, AppError::Config(_)));
        assert!(!err.user_message().is_empty());
    }

    #[test]
    fn test_commentary_message_keeps_weather_framing() {
        let err = AppError::Commentary("invalid AI response".to_string());
        assert!(err.user_message().contains("weather is shown"));
    }
}
