//! Temperature series classification
//!
//! Input series are chronological (oldest first). Fewer than two values
//! cannot describe a change, so every classification reports
//! `InsufficientData` in that case.

use serde::{Deserialize, Serialize};

use crate::models::forecast::round1;

/// Amplitude below this is low variation (°C)
pub const LOW_VARIATION_AMPLITUDE: f64 = 2.0;
/// Amplitude up to and including this is moderate variation (°C)
pub const MODERATE_VARIATION_AMPLITUDE: f64 = 5.0;
/// Mean step between consecutive readings below this is stable (°C)
pub const STABLE_MEAN_DELTA: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variation {
    Low,
    Moderate,
    High,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Unstable,
    InsufficientData,
}

/// Descriptive statistics of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    pub min: f64,
    pub max: f64,
    /// Mean, rounded to one decimal
    pub average: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureAnalysis {
    pub trend: Trend,
    pub variation: Variation,
    pub stability: Stability,
    /// Present whenever the series had at least one value
    pub stats: Option<TemperatureStats>,
}

impl TemperatureAnalysis {
    #[must_use]
    pub fn is_insufficient(&self) -> bool {
        self.trend == Trend::InsufficientData
    }
}

fn stats(temperatures: &[f64]) -> Option<TemperatureStats> {
    if temperatures.is_empty() {
        return None;
    }
    let min = temperatures.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = temperatures.iter().sum::<f64>() / temperatures.len() as f64;
    Some(TemperatureStats {
        min,
        max,
        average: round1(mean),
        count: temperatures.len(),
    })
}

/// Classify a chronological temperature series
#[must_use]
pub fn analyze_temperature(temperatures: &[f64]) -> TemperatureAnalysis {
    let stats = stats(temperatures);

    let (Some(first), Some(last), Some(summary)) =
        (temperatures.first(), temperatures.last(), stats.as_ref())
    else {
        return insufficient(stats);
    };
    if temperatures.len() < 2 {
        return insufficient(stats);
    }

    let trend = if last > first {
        Trend::Up
    } else if last < first {
        Trend::Down
    } else {
        Trend::Stable
    };

    let amplitude = summary.max - summary.min;
    let variation = if amplitude < LOW_VARIATION_AMPLITUDE {
        Variation::Low
    } else if amplitude <= MODERATE_VARIATION_AMPLITUDE {
        Variation::Moderate
    } else {
        Variation::High
    };

    let deltas: Vec<f64> = temperatures
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .collect();
    let average_delta = deltas.iter().sum::<f64>() / deltas.len() as f64;
    let stability = if average_delta < STABLE_MEAN_DELTA {
        Stability::Stable
    } else {
        Stability::Unstable
    };

    TemperatureAnalysis {
        trend,
        variation,
        stability,
        stats,
    }
}

fn insufficient(stats: Option<TemperatureStats>) -> TemperatureAnalysis {
    TemperatureAnalysis {
        trend: Trend::InsufficientData,
        variation: Variation::InsufficientData,
        stability: Stability::InsufficientData,
        stats,
    }
}
