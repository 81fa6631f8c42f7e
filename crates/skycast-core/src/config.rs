use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory (also holds the forecast cache slot)
    pub config_dir: PathBuf,

    /// Cache and fetch settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Commentary generation settings
    #[serde(default)]
    pub commentary: CommentaryConfig,
}

/// Weather fetch and cache-reuse settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Maximum distance (km) between a cached coordinate and a new request
    /// for the cached result to be reused.
    #[serde(default = "default_proximity_km")]
    pub proximity_km: f64,

    /// Maximum age (minutes) of a cached result eligible for reuse.
    #[serde(default = "default_freshness_minutes")]
    pub freshness_minutes: i64,
}

fn default_proximity_km() -> f64 {
    5.0
}

fn default_freshness_minutes() -> i64 {
    30
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            proximity_km: default_proximity_km(),
            freshness_minutes: default_freshness_minutes(),
        }
    }
}

/// Commentary generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentaryConfig {
    /// Model identifier passed to the generative API
    #[serde(default = "default_model")]
    pub model: String,

    /// Target language for generated commentary (BCP-47-ish short code)
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_model() -> String {
    "gemma-3-27b-it".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl CommentaryConfig {
    /// API key is never stored in the config file; read from environment.
    pub fn api_key() -> Option<String> {
        std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            language: default_language(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            commentary: CommentaryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        config.validate().map_err(anyhow::Error::from)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Path of the config file on this machine.
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("skycast");
        Ok(dir.join("config.toml"))
    }

    /// Reject settings that would make the cache guard nonsensical.
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        if !self.weather.proximity_km.is_finite() || self.weather.proximity_km <= 0.0 {
            return Err(crate::error::ConfigError::Invalid(format!(
                "weather.proximity_km must be positive, got {}",
                self.weather.proximity_km
            )));
        }
        if self.weather.freshness_minutes <= 0 {
            return Err(crate::error::ConfigError::Invalid(format!(
                "weather.freshness_minutes must be positive, got {}",
                self.weather.freshness_minutes
            )));
        }
        if self.commentary.model.trim().is_empty() {
            return Err(crate::error::ConfigError::MissingSetting(
                "commentary.model".to_string(),
            ));
        }
        Ok(())
    }
}
