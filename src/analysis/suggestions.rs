use super::temperature::{Stability, TemperatureAnalysis, Trend, Variation};

pub const WAIT_FOR_DATA: &str = "Wait for more data to receive weather suggestions.";

/// Practical advice for the analyzed period
#[must_use]
pub fn suggest_actions(analysis: &TemperatureAnalysis) -> Vec<String> {
    if analysis.is_insufficient() {
        return vec![WAIT_FOR_DATA.to_string()];
    }

    let mut suggestions = Vec::new();

    match analysis.variation {
        Variation::High => {
            suggestions.push("Be prepared for temperature swings throughout the day.")
        }
        Variation::Moderate => {
            suggestions.push("Allow for possible temperature changes during the period.")
        }
        _ => {}
    }

    if analysis.stability == Stability::Unstable {
        suggestions.push("Keep an extra layer at hand to cope with quick weather changes.");
    } else {
        suggestions.push("Stable conditions favor planning outdoor activities.");
    }

    match analysis.trend {
        Trend::Up => suggestions.push("Lighter clothing may be more comfortable."),
        Trend::Down => suggestions.push("An additional layer of clothing may be useful."),
        _ => {}
    }

    suggestions.into_iter().map(String::from).collect()
}
