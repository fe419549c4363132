//! Per-day forecast summaries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of forecast, summarized from the 3-hourly slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Local date at the forecast location
    pub date: NaiveDate,
    /// Mean temperature of the day's slots in Celsius, one decimal
    pub avg_temp: f64,
    /// Condition of the first slot of the day
    pub description: String,
}

impl DailyForecast {
    /// Summarize one day from its slot temperatures and descriptions.
    /// Returns `None` when the day has no slots.
    #[must_use]
    pub fn summarize(
        date: NaiveDate,
        temperatures: &[f64],
        descriptions: &[String],
    ) -> Option<Self> {
        if temperatures.is_empty() {
            return None;
        }
        let mean = temperatures.iter().sum::<f64>() / temperatures.len() as f64;
        Some(Self {
            date,
            avg_temp: round1(mean),
            description: descriptions.first().cloned().unwrap_or_default(),
        })
    }
}

/// Round to one decimal place
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let day = DailyForecast::summarize(
            date,
            &[20.0, 22.15, 25.0],
            &["clear sky".to_string(), "few clouds".to_string(), "rain".to_string()],
        )
        .unwrap();
        assert_eq!(day.avg_temp, 22.4);
        assert_eq!(day.description, "clear sky");
    }

    #[test]
    fn test_summarize_empty_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(DailyForecast::summarize(date, &[], &[]).is_none());
    }
}
