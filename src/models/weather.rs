//! Current conditions and persisted weather readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::location::normalize_city;

const MAX_CITY_LEN: usize = 100;
const MAX_COUNTRY_LEN: usize = 10;
const MAX_CONDITION_LEN: usize = 100;

/// Current conditions for a place, normalized from the provider response
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentWeather {
    /// City name as reported by the provider
    pub city: String,
    /// Country code
    pub country: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Human-readable description of weather conditions
    pub condition: String,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// When the provider observed these conditions
    pub observed_at: DateTime<Utc>,
}

impl CurrentWeather {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Reading to persist for this observation
    #[must_use]
    pub fn to_reading(&self, recorded_at: DateTime<Utc>) -> NewReading {
        NewReading {
            city: self.city.clone(),
            country: self.country.clone(),
            temperature: self.temperature,
            feels_like: self.feels_like,
            humidity: self.humidity,
            condition: self.condition.clone(),
            recorded_at,
        }
    }
}

/// A reading that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub condition: String,
    pub recorded_at: DateTime<Utc>,
}

impl NewReading {
    /// Apply the column constraints of the readings table
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.city = truncate(&normalize_city(&self.city), MAX_CITY_LEN);
        self.country = truncate(self.country.trim(), MAX_COUNTRY_LEN);
        self.condition = truncate(self.condition.trim(), MAX_CONDITION_LEN);
        self.humidity = self.humidity.min(100);
        self
    }
}

/// A stored weather observation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherReading {
    pub id: i64,
    /// Normalized (trimmed, lowercase) city name
    pub city: String,
    pub country: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    pub condition: String,
    /// Set once at insert time
    pub recorded_at: DateTime<Utc>,
}

impl fmt::Display for WeatherReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}°C ({})",
            self.city,
            self.temperature,
            self.recorded_at.date_naive()
        )
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
