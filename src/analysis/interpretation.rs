use super::temperature::{Stability, TemperatureAnalysis, Trend, Variation};

pub const NOT_ENOUGH_DATA: &str =
    "There is not enough data yet to analyze the temperature variation.";

/// One sentence describing trend, variation and stability
#[must_use]
pub fn interpret(analysis: &TemperatureAnalysis) -> String {
    if analysis.is_insufficient() {
        return NOT_ENOUGH_DATA.to_string();
    }

    let trend = match analysis.trend {
        Trend::Up => "The temperature showed an upward trend",
        Trend::Down => "The temperature showed a downward trend",
        _ => "The temperature remained steady",
    };
    let variation = match analysis.variation {
        Variation::Low => "with little variation over the period",
        Variation::Moderate => "with moderate variation over the period",
        _ => "with sharp variation over the period",
    };
    let stability = match analysis.stability {
        Stability::Stable => "and gradual changes between readings",
        _ => "and abrupt changes between readings",
    };

    format!("{trend}, {variation}, {stability}.")
}
