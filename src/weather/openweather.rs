//! OpenWeather API client
//!
//! Fetches current conditions and the 5 day / 3 hour forecast, maps HTTP
//! failures onto [`WeatherDashError`] and normalizes responses into the
//! service's own models. Transient failures are retried with exponential
//! backoff by the middleware stack.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::WeatherProvider;
use crate::config::OpenWeatherConfig;
use crate::models::{CurrentWeather, DailyForecast};
use crate::{Result, WeatherDashError};

/// Description used when the provider omits the condition list
pub const UNDEFINED_CONDITION: &str = "undefined";

/// Async client for the OpenWeather data API
pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    lang: String,
}

impl OpenWeatherClient {
    /// Create a client from configuration. Fails when no API key is configured.
    pub fn new(config: &OpenWeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                WeatherDashError::config(
                    "Missing OpenWeather API key. Set OPENWEATHER_API_KEY or openweather.api_key.",
                )
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("weatherdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherDashError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            lang: config.lang.clone(),
        })
    }

    fn url(&self, endpoint: &str, query: &str) -> String {
        format!(
            "{}/{}?{}&appid={}&units=metric&lang={}",
            self.base_url,
            endpoint,
            query,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.lang)
        )
    }

    /// Remove the API key from anything that may end up in logs or errors
    fn redact(&self, message: &str) -> String {
        message.replace(&self.api_key, "***")
    }

    #[instrument(skip(self, query))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &str,
        subject: &str,
    ) -> Result<T> {
        let start_time = Instant::now();
        let url = self.url(endpoint, query);

        let response = self.client.get(&url).send().await.map_err(|e| {
            let message = match e {
                reqwest_middleware::Error::Reqwest(err) => err.without_url().to_string(),
                reqwest_middleware::Error::Middleware(err) => err.to_string(),
            };
            warn!("Weather API request failed: {}", self.redact(&message));
            WeatherDashError::api_unavailable(format!(
                "Could not connect to the weather API: {}",
                self.redact(&message)
            ))
        })?;

        let status = response.status();
        debug!(
            "Weather API responded {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Weather API rejected the API key (HTTP 401)");
                return Err(WeatherDashError::api_auth("Invalid API key"));
            }
            StatusCode::NOT_FOUND => {
                info!("Weather API does not know '{}'", subject);
                return Err(WeatherDashError::city_not_found(subject));
            }
            s if !s.is_success() => {
                warn!("Weather API returned unexpected status {}", s);
                return Err(WeatherDashError::api_unavailable(format!(
                    "Unexpected status {s} while querying the weather"
                )));
            }
            _ => {}
        }

        let parsed = response.json::<T>().await.map_err(|e| {
            WeatherDashError::invalid_response(self.redact(&e.without_url().to_string()))
        })?;

        let total = start_time.elapsed();
        if total.as_secs() > 5 {
            warn!("Slow weather API response: {:.3}s", total.as_secs_f64());
        }

        Ok(parsed)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current_by_city(&self, city: &str) -> Result<CurrentWeather> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherDashError::validation("City cannot be empty"));
        }
        let query = format!("q={}", urlencoding::encode(city));
        let response: CurrentResponse = self.get_json("weather", &query, city).await?;
        Ok(response.normalize(city))
    }

    #[instrument(skip(self))]
    async fn current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentWeather> {
        let query = format!("lat={latitude}&lon={longitude}");
        let subject = format!("{latitude:.4}, {longitude:.4}");
        let response: CurrentResponse = self.get_json("weather", &query, &subject).await?;
        Ok(response.normalize(&subject))
    }

    #[instrument(skip(self))]
    async fn forecast_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<DailyForecast>> {
        let query = format!("lat={latitude}&lon={longitude}");
        let subject = format!("{latitude:.4}, {longitude:.4}");
        let response: ForecastResponse = self.get_json("forecast", &query, &subject).await?;
        let offset = response.city.map(|c| c.timezone).unwrap_or_default();
        let days = group_by_local_day(&response.list, offset);
        info!("Forecast for {} covers {} day(s)", subject, days.len());
        Ok(days)
    }
}

/// Group forecast slots by local calendar day, chronologically
fn group_by_local_day(slots: &[ForecastSlot], utc_offset_seconds: i32) -> Vec<DailyForecast> {
    let offset = FixedOffset::east_opt(utc_offset_seconds).unwrap_or_else(|| Utc.fix());

    let mut days: BTreeMap<NaiveDate, (Vec<f64>, Vec<String>)> = BTreeMap::new();
    for slot in slots {
        let Some(timestamp) = DateTime::from_timestamp(slot.dt, 0) else {
            debug!("Skipping forecast slot with invalid timestamp {}", slot.dt);
            continue;
        };
        let date = timestamp.with_timezone(&offset).date_naive();
        let entry = days.entry(date).or_default();
        entry.0.push(slot.main.temp);
        entry.1.push(
            slot.weather
                .first()
                .map(|c| c.description.clone())
                .unwrap_or_else(|| UNDEFINED_CONDITION.to_string()),
        );
    }

    days.into_iter()
        .filter_map(|(date, (temps, descriptions))| {
            DailyForecast::summarize(date, &temps, &descriptions)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    dt: Option<i64>,
    #[serde(default)]
    sys: Option<Sys>,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    wind: Option<Wind>,
}

#[derive(Debug, Deserialize)]
struct Sys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastSlot>,
    #[serde(default)]
    city: Option<ForecastCity>,
}

#[derive(Debug, Deserialize)]
struct ForecastSlot {
    dt: i64,
    main: SlotReadings,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct SlotReadings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastCity {
    /// Shift in seconds from UTC
    #[serde(default)]
    timezone: i32,
}

impl CurrentResponse {
    fn normalize(self, requested: &str) -> CurrentWeather {
        let city = match self.name.trim() {
            "" => requested.trim().to_string(),
            name => name.to_string(),
        };
        CurrentWeather {
            city,
            country: self.sys.and_then(|s| s.country).unwrap_or_default(),
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity.round().clamp(0.0, 100.0) as u8,
            condition: self
                .weather
                .into_iter()
                .next()
                .map(|c| c.description)
                .unwrap_or_else(|| UNDEFINED_CONDITION.to_string()),
            wind_speed: self.wind.map(|w| w.speed).unwrap_or_default(),
            observed_at: self
                .dt
                .and_then(|dt| DateTime::from_timestamp(dt, 0))
                .unwrap_or_else(Utc::now),
        }
    }
}
