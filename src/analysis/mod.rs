//! Rule-based weather insights
//!
//! Pure functions turning temperature series and current conditions into
//! descriptive analysis:
//! - temperature: trend, variation and stability classification plus summary stats
//! - interpretation: one-sentence description of an analysis
//! - impact: health and comfort notes
//! - suggestions: actionable advice
//! - comfort: thermal comfort level from temperature and humidity
//! - insight: the combined temperature insight served by the API

pub mod comfort;
pub mod impact;
pub mod insight;
pub mod interpretation;
pub mod suggestions;
pub mod temperature;

pub use comfort::{ComfortFactor, ComfortInputs, ComfortLevel, ThermalComfort, thermal_comfort};
pub use impact::{TemperatureImpact, assess_impact};
pub use insight::{TemperatureInsight, build_temperature_insight};
pub use interpretation::interpret;
pub use suggestions::suggest_actions;
pub use temperature::{
    Stability, TemperatureAnalysis, TemperatureStats, Trend, Variation, analyze_temperature,
};
