//! Weather providers
//!
//! The service talks to weather sources through [`WeatherProvider`] so that the
//! OpenWeather client can be swapped for a fake in tests.

use async_trait::async_trait;

use crate::Result;
use crate::models::{CurrentWeather, DailyForecast};

pub mod openweather;

pub use openweather::OpenWeatherClient;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for a city name
    async fn current_by_city(&self, city: &str) -> Result<CurrentWeather>;

    /// Current conditions at a coordinate pair
    async fn current_by_coordinates(&self, latitude: f64, longitude: f64)
    -> Result<CurrentWeather>;

    /// Multi-day forecast at a coordinate pair, one entry per local day
    async fn forecast_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<DailyForecast>>;
}
