//! Error types and handling for the `WeatherDash` service

use thiserror::Error;

/// Main error type for the `WeatherDash` service
#[derive(Error, Debug)]
pub enum WeatherDashError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// OpenWeather does not know the requested city
    #[error("City '{city}' not found")]
    CityNotFound { city: String },

    /// OpenWeather rejected the API key
    #[error("Weather API authentication failed: {message}")]
    ApiAuth { message: String },

    /// OpenWeather could not be reached or answered with an unexpected status
    #[error("Weather API unavailable: {message}")]
    ApiUnavailable { message: String },

    /// OpenWeather answered with a body we could not understand
    #[error("Invalid weather API response: {message}")]
    InvalidResponse { message: String },

    /// No stored readings exist for the city
    #[error("No historical temperature data for '{city}'")]
    NoHistory { city: String },

    /// Not enough stored readings to analyze a trend
    #[error("Insufficient data for temperature trend analysis: {available} reading(s)")]
    InsufficientData { available: usize },

    /// Reading history errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherDashError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn city_not_found<S: Into<String>>(city: S) -> Self {
        Self::CityNotFound { city: city.into() }
    }

    pub fn api_auth<S: Into<String>>(message: S) -> Self {
        Self::ApiAuth {
            message: message.into(),
        }
    }

    pub fn api_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ApiUnavailable {
            message: message.into(),
        }
    }

    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn no_history<S: Into<String>>(city: S) -> Self {
        Self::NoHistory { city: city.into() }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherDashError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            WeatherDashError::Validation { message } => format!("Invalid input: {message}"),
            WeatherDashError::CityNotFound { city } => format!("City '{city}' not found."),
            WeatherDashError::ApiAuth { .. } => {
                "The weather provider rejected the API key.".to_string()
            }
            WeatherDashError::ApiUnavailable { .. } | WeatherDashError::InvalidResponse { .. } => {
                "Unable to fetch weather data right now. Please try again later.".to_string()
            }
            WeatherDashError::NoHistory { city } => {
                format!("There is no historical temperature data for '{city}'.")
            }
            WeatherDashError::InsufficientData { .. } => {
                "Insufficient data for temperature trend analysis.".to_string()
            }
            WeatherDashError::Storage { .. } | WeatherDashError::Io { .. } => {
                "An unexpected error occurred while handling weather data.".to_string()
            }
        }
    }

    /// Whether the failure originated at the OpenWeather boundary
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            WeatherDashError::ApiAuth { .. }
                | WeatherDashError::ApiUnavailable { .. }
                | WeatherDashError::InvalidResponse { .. }
                | WeatherDashError::CityNotFound { .. }
        )
    }
}

impl From<rusqlite::Error> for WeatherDashError {
    fn from(err: rusqlite::Error) -> Self {
        WeatherDashError::storage(err.to_string())
    }
}
