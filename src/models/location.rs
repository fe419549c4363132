//! Location model for named places and their coordinates

use serde::{Deserialize, Serialize};

/// Normalize a city name for storage and lookups
#[must_use]
pub fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

/// A named place, optionally pinned to coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Location name (city, region, etc.)
    pub name: String,
    /// Latitude in decimal degrees
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Country code (ISO 3166-1 alpha-2)
    #[serde(default)]
    pub country: Option<String>,
}

impl Location {
    /// Create a location known only by name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latitude: None,
            longitude: None,
            country: None,
        }
    }

    #[must_use]
    pub fn with_coordinates(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            country: None,
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        match self.coordinates() {
            Some((lat, lon)) => format!("{lat:.4}, {lon:.4}"),
            None => "unknown".to_string(),
        }
    }

    /// Cache key for a current-weather lookup by city name
    #[must_use]
    pub fn city_cache_key(city: &str) -> String {
        format!("weather:{}", normalize_city(city).replace(' ', "_"))
    }

    /// Cache key for a forecast lookup, rounded to two decimals
    #[must_use]
    pub fn forecast_cache_key(&self) -> Option<String> {
        self.coordinates()
            .map(|(lat, lon)| format!("forecast:{lat:.2}:{lon:.2}"))
    }
}
