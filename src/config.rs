//! Configuration management for the `WeatherDash` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherDashError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::models::Location;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable consulted when no API key is configured explicitly
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Root configuration structure for the `WeatherDash` service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherDashConfig {
    /// OpenWeather API configuration
    pub openweather: OpenWeatherConfig,
    /// Response cache configuration
    pub cache: CacheConfig,
    /// Reading history database configuration
    pub storage: StorageConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Default application settings
    pub defaults: DefaultsConfig,
}

/// OpenWeather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    /// OpenWeather API key, falls back to `OPENWEATHER_API_KEY`
    pub api_key: Option<String>,
    /// Base URL for the OpenWeather data API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
    /// Language code for condition descriptions
    #[serde(default = "default_weather_lang")]
    pub lang: String,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL of cached current-weather lookups in minutes
    #[serde(default = "default_cache_ttl")]
    pub ttl_minutes: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Reading history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Readings older than this are pruned at startup
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Readings returned by history lookups without an explicit limit
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
    /// Window of the temperature trend analysis in hours
    #[serde(default = "default_recent_hours")]
    pub recent_hours: u32,
    /// Location shown on the dashboard
    #[serde(default)]
    pub location: Option<Location>,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_weather_max_retries() -> u32 {
    3
}

fn default_weather_lang() -> String {
    "en".to_string()
}

fn default_cache_ttl() -> u32 {
    10
}

fn default_cache_location() -> String {
    "~/.cache/weatherdash".to_string()
}

fn default_database_path() -> String {
    "~/.local/share/weatherdash/history.db".to_string()
}

fn default_retention_days() -> u32 {
    365
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_request_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_history_limit() -> u32 {
    DEFAULT_HISTORY_LIMIT
}

fn default_recent_hours() -> u32 {
    24
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_weather_max_retries(),
            lang: default_weather_lang(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            retention_days: default_retention_days(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            recent_hours: default_recent_hours(),
            location: None,
        }
    }
}

impl Default for WeatherDashConfig {
    fn default() -> Self {
        Self {
            openweather: OpenWeatherConfig::default(),
            cache: CacheConfig::default(),
            storage: StorageConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl WeatherDashConfig {
    /// Load configuration from specified path and the process environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_layered(config_path, None)
    }

    /// Layers the TOML file under the `WEATHERDASH_*` variables. `env_vars`
    /// replaces the process environment when given.
    fn load_layered(
        config_path: Option<PathBuf>,
        env_vars: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHERDASH_OPENWEATHER__API_KEY -> openweather.api_key
        builder = builder.add_source(
            Environment::with_prefix("WEATHERDASH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env_vars.clone()),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherDashConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.openweather.api_key.is_none() {
            let fallback = match &env_vars {
                Some(vars) => vars.get(API_KEY_ENV).cloned(),
                None => env::var(API_KEY_ENV).ok(),
            };
            config.openweather.api_key = fallback.filter(|k| !k.is_empty());
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherdash").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.openweather.base_url.is_empty() {
            self.openweather.base_url = default_weather_base_url();
        }
        if self.openweather.timeout_seconds == 0 {
            self.openweather.timeout_seconds = default_weather_timeout();
        }
        if self.openweather.lang.is_empty() {
            self.openweather.lang = default_weather_lang();
        }
        if self.cache.ttl_minutes == 0 {
            self.cache.ttl_minutes = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.storage.database_path.is_empty() {
            self.storage.database_path = default_database_path();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.history_limit == 0 {
            self.defaults.history_limit = default_history_limit();
        }
        if self.defaults.recent_hours == 0 {
            self.defaults.recent_hours = default_recent_hours();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the API key if one is configured
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.openweather.api_key {
            if api_key.trim().is_empty() {
                return Err(WeatherDashError::config(concat!(
                    "OpenWeather API key cannot be empty if provided. ",
                    "Either remove it or provide a valid key."
                ))
                .into());
            }

            if api_key.len() > 100 {
                return Err(WeatherDashError::config(concat!(
                    "OpenWeather API key appears to be invalid (too long). ",
                    "Please check your API key."
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.openweather.timeout_seconds > 120 {
            return Err(
                WeatherDashError::config("OpenWeather timeout cannot exceed 120 seconds").into(),
            );
        }

        if self.openweather.max_retries > 10 {
            return Err(WeatherDashError::config("OpenWeather max retries cannot exceed 10").into());
        }

        if self.cache.ttl_minutes > 24 * 60 {
            return Err(
                WeatherDashError::config("Cache TTL cannot exceed 1440 minutes (1 day)").into(),
            );
        }

        if self.storage.retention_days > 3650 {
            return Err(WeatherDashError::config("Retention cannot exceed 3650 days").into());
        }

        if self.server.request_timeout_seconds > 300 {
            return Err(
                WeatherDashError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.defaults.history_limit > 1000 {
            return Err(WeatherDashError::config("History limit cannot exceed 1000").into());
        }

        if self.defaults.recent_hours > 24 * 31 {
            return Err(WeatherDashError::config("Trend window cannot exceed 744 hours").into());
        }

        if let Some(location) = &self.defaults.location {
            if let (Some(lat), Some(lon)) = (location.latitude, location.longitude) {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(WeatherDashError::config(format!(
                        "Default location coordinates out of range: {lat}, {lon}"
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherDashError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherDashError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.openweather.base_url.starts_with("http://")
            && !self.openweather.base_url.starts_with("https://")
        {
            return Err(WeatherDashError::config(
                "OpenWeather base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Cache directory with `~` expanded
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        expand_home(&self.cache.location)
    }

    /// History database path with `~` expanded
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        expand_home(&self.storage.database_path)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
