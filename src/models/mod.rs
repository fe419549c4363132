//! Data models for the WeatherDash service
//!
//! This module contains the core domain models organized by concern:
//! - Location: named places with optional coordinates
//! - Weather: current conditions and persisted readings
//! - Forecast: per-day forecast summaries

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::DailyForecast;
pub use location::{Location, normalize_city};
pub use weather::{CurrentWeather, NewReading, WeatherReading};
