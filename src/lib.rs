//! `WeatherDash` - current weather, reading history and temperature insights
//!
//! This library fetches conditions from OpenWeather, records every lookup
//! as a reading, and derives rule-based insights from the stored history.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod service;
pub mod weather;
pub mod web;

use tracing_subscriber::{EnvFilter, fmt};

// Re-export core types for public API
pub use analysis::{TemperatureInsight, ThermalComfort};
pub use cache::PersistentCache;
pub use config::WeatherDashConfig;
pub use error::WeatherDashError;
pub use history::ReadingStore;
pub use models::{CurrentWeather, DailyForecast, Location, WeatherReading};
pub use service::WeatherService;
pub use weather::{OpenWeatherClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherDashError>;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level; `verbose`
/// forces `debug`. Calling this twice keeps the first subscriber.
pub fn init_tracing(logging: &config::LoggingConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    if logging.format == "json" {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}
