use serde::{Deserialize, Serialize};

use super::temperature::{Stability, TemperatureAnalysis, Trend, Variation};

/// Health and comfort notes derived from an analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureImpact {
    pub health: String,
    pub comfort: String,
}

#[must_use]
pub fn assess_impact(analysis: &TemperatureAnalysis) -> TemperatureImpact {
    if analysis.is_insufficient() {
        return TemperatureImpact {
            health: "The health impact cannot be assessed yet for lack of data.".to_string(),
            comfort: "Comfort cannot be assessed yet for lack of data.".to_string(),
        };
    }

    let mut health = Vec::new();
    let mut comfort = Vec::new();

    match analysis.variation {
        Variation::High => {
            comfort.push(
                "The high temperature variation may cause thermal discomfort over the period.",
            );
            health.push("Extreme variations can affect health, especially for vulnerable groups.");
        }
        Variation::Moderate => {
            comfort.push("The moderate temperature variation may be noticeable during the day.");
            health.push("Moderate variations usually pose no health risk.");
        }
        _ => {
            comfort.push("The low temperature variation tends to provide greater thermal comfort.");
            health.push("Stable temperatures favor well-being and health.");
        }
    }

    if analysis.stability == Stability::Unstable {
        health.push("Abrupt changes may indicate a health risk and call for closer attention.");
    } else {
        health.push("Gradual changes indicate a more predictable and safer environment.");
    }

    match analysis.trend {
        Trend::Up => {
            comfort.push("The upward trend may lead to a warmer thermal sensation.");
            health.push("Rising temperatures can increase the risk of dehydration.");
        }
        Trend::Down => {
            comfort.push("The downward trend may lead to a milder thermal sensation.");
            health.push(
                "Falling temperatures increase the risk of hypothermia in vulnerable groups.",
            );
        }
        _ => {}
    }

    TemperatureImpact {
        health: health.join(" "),
        comfort: comfort.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_temperature;

    #[test]
    fn test_insufficient_data() {
        let impact = assess_impact(&analyze_temperature(&[]));
        assert!(impact.health.contains("lack of data"));
        assert!(impact.comfort.contains("lack of data"));
    }

    #[test]
    fn test_high_variation_rising() {
        let impact = assess_impact(&analyze_temperature(&[15.0, 25.0]));
        assert!(impact.comfort.starts_with("The high temperature variation"));
        assert!(impact.comfort.contains("warmer thermal sensation"));
        assert!(impact.health.contains("Abrupt changes"));
        assert!(impact.health.ends_with("risk of dehydration."));
    }

    #[test]
    fn test_flat_series_has_no_trend_note() {
        let impact = assess_impact(&analyze_temperature(&[20.0, 20.2, 20.0]));
        assert_eq!(
            impact.comfort,
            "The low temperature variation tends to provide greater thermal comfort."
        );
        assert!(impact.health.contains("Gradual changes"));
        assert!(!impact.health.contains("dehydration"));
        assert!(!impact.health.contains("hypothermia"));
    }
}
