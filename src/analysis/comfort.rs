//! Thermal comfort from temperature and humidity

use serde::{Deserialize, Serialize};

use crate::models::CurrentWeather;

const HIGH_HUMIDITY: f64 = 70.0;
const HIGH_TEMPERATURE: f64 = 30.0;
const LOW_TEMPERATURE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComfortLevel {
    Unknown,
    Moderate,
    Low,
}

impl ComfortLevel {
    /// Presentation hint used by the dashboard
    #[must_use]
    pub fn ui_level(self) -> &'static str {
        match self {
            Self::Unknown => "neutral",
            Self::Moderate => "good",
            Self::Low => "bad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComfortFactor {
    HighHumidity,
    HighTemperature,
    LowTemperature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalComfort {
    pub level: ComfortLevel,
    pub summary: String,
    pub factors: Vec<ComfortFactor>,
}

/// Raw readings the comfort rules look at
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComfortInputs {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    /// Accepted for completeness, not scored
    pub wind_speed: Option<f64>,
}

impl From<&CurrentWeather> for ComfortInputs {
    fn from(weather: &CurrentWeather) -> Self {
        Self {
            temperature: Some(weather.temperature),
            humidity: Some(f64::from(weather.humidity)),
            wind_speed: Some(weather.wind_speed),
        }
    }
}

#[must_use]
pub fn thermal_comfort(inputs: &ComfortInputs) -> ThermalComfort {
    let (Some(temperature), Some(humidity)) = (inputs.temperature, inputs.humidity) else {
        return ThermalComfort {
            level: ComfortLevel::Unknown,
            summary: "Not enough data to assess thermal comfort".to_string(),
            factors: Vec::new(),
        };
    };

    let mut factors = Vec::new();
    if humidity >= HIGH_HUMIDITY {
        factors.push(ComfortFactor::HighHumidity);
    }
    if temperature >= HIGH_TEMPERATURE {
        factors.push(ComfortFactor::HighTemperature);
    }
    if temperature <= LOW_TEMPERATURE {
        factors.push(ComfortFactor::LowTemperature);
    }

    let (level, summary) = if factors.contains(&ComfortFactor::HighTemperature)
        && factors.contains(&ComfortFactor::HighHumidity)
    {
        (ComfortLevel::Low, "Feels hot and humid")
    } else if factors.contains(&ComfortFactor::LowTemperature) {
        (ComfortLevel::Low, "Feels markedly cold")
    } else {
        (ComfortLevel::Moderate, "Reasonably comfortable thermal conditions")
    };

    ThermalComfort {
        level,
        summary: summary.to_string(),
        factors,
    }
}
