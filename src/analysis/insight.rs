use serde::{Deserialize, Serialize};

use super::{
    TemperatureAnalysis, TemperatureImpact, analyze_temperature, assess_impact, interpret,
    suggest_actions,
};

/// Everything the temperature insight endpoints return about a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureInsight {
    pub analysis: TemperatureAnalysis,
    pub interpretation: String,
    pub impact: TemperatureImpact,
    pub suggestions: Vec<String>,
}

/// Analyze a chronological temperature series and describe it
#[must_use]
pub fn build_temperature_insight(temperatures: &[f64]) -> TemperatureInsight {
    let analysis = analyze_temperature(temperatures);
    TemperatureInsight {
        interpretation: interpret(&analysis),
        impact: assess_impact(&analysis),
        suggestions: suggest_actions(&analysis),
        analysis,
    }
}
