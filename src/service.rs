//! Weather service: the operations behind the HTTP API and the CLI
//!
//! Combines the weather provider, the TTL cache and the reading history.
//! Current-weather lookups by city go cache first, then provider, and every
//! successful lookup is recorded as a reading.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::RngExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::analysis::{
    ComfortInputs, TemperatureInsight, ThermalComfort, build_temperature_insight, thermal_comfort,
};
use crate::cache::PersistentCache;
use crate::config::WeatherDashConfig;
use crate::history::{CitySummary, ReadingStore};
use crate::models::{CurrentWeather, DailyForecast, Location, WeatherReading};
use crate::weather::{OpenWeatherClient, WeatherProvider};
use crate::{Result, WeatherDashError};

/// Readings feeding the per-city temperature insight and the home chart
pub const INSIGHT_READINGS: u32 = 10;

const CHART_LABEL_FORMAT: &str = "%d/%m %H:%M";

/// Temperature insight for a city's stored history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityInsight {
    pub city: String,
    pub insight: TemperatureInsight,
}

/// Temperature insight for the readings of the recent window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureTrend {
    pub city: String,
    #[serde(flatten)]
    pub insight: TemperatureInsight,
}

/// Thermal comfort with its presentation hint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardInsight {
    #[serde(flatten)]
    pub comfort: ThermalComfort,
    pub ui_level: &'static str,
}

/// Conditions for the configured default location
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub location: Option<Location>,
    pub weather: Option<CurrentWeather>,
    pub forecast: Vec<DailyForecast>,
    pub insights: Option<DashboardInsight>,
    pub error: Option<String>,
}

/// City search page: current weather plus recent history
#[derive(Debug, Clone, Default, Serialize)]
pub struct Home {
    pub city: Option<String>,
    pub weather: Option<CurrentWeather>,
    pub error: Option<String>,
    /// Newest first
    pub history: Vec<WeatherReading>,
    /// Chart axis, oldest first
    pub labels: Vec<String>,
    pub temperatures: Vec<f64>,
}

pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    cache: Option<PersistentCache>,
    store: ReadingStore,
    config: WeatherDashConfig,
}

impl WeatherService {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        cache: Option<PersistentCache>,
        store: ReadingStore,
        config: WeatherDashConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            store,
            config,
        }
    }

    /// Build the service with the OpenWeather client and on-disk stores.
    /// A cache that cannot be opened is logged and skipped.
    pub fn from_config(config: WeatherDashConfig) -> Result<Self> {
        let client = OpenWeatherClient::new(&config.openweather)?;
        let store = ReadingStore::open(&config.database_path())?;

        let cache_dir = config.cache_dir();
        let cache = match PersistentCache::open(&cache_dir) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Cache disabled, failed to open {}: {e:#}", cache_dir.display());
                None
            }
        };

        Ok(Self::new(Arc::new(client), cache, store, config))
    }

    pub fn config(&self) -> &WeatherDashConfig {
        &self.config
    }

    pub fn store(&self) -> &ReadingStore {
        &self.store
    }

    fn cache_ttl(&self) -> Duration {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        Duration::from_secs(u64::from(self.config.cache.ttl_minutes) * 60).mul_f64(jitter)
    }

    async fn cached<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        let cache = self.cache.as_ref()?;
        match cache.get::<T>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache read failed for {key}: {e:#}");
                None
            }
        }
    }

    async fn store_cached<T>(&self, key: &str, value: T)
    where
        T: Serialize + Send + std::fmt::Debug + 'static,
    {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.put(key, value, self.cache_ttl()).await {
            warn!("Cache write failed for {key}: {e:#}");
        }
    }

    /// Current weather for a city, served from cache when fresh
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather> {
        let city = required_city(city)?;
        let key = Location::city_cache_key(city);
        if let Some(weather) = self.cached::<CurrentWeather>(&key).await {
            debug!("Serving {city} from cache");
            return Ok(weather);
        }

        let weather = self.provider.current_by_city(city).await?;
        self.store_cached(&key, weather.clone()).await;
        Ok(weather)
    }

    /// Look up current weather for a city and record it as a reading
    #[instrument(skip(self))]
    pub async fn fetch_and_record(&self, city: &str) -> Result<CurrentWeather> {
        let weather = self.current_weather(city).await?;
        let reading = self.store.insert(weather.to_reading(Utc::now())).await?;
        info!("Recorded reading {} for {}", reading.id, reading.city);
        Ok(weather)
    }

    /// Stored readings for a city, newest first
    pub async fn city_history(
        &self,
        city: &str,
        limit: Option<u32>,
    ) -> Result<Vec<WeatherReading>> {
        let city = required_city(city)?;
        let limit = limit.unwrap_or(self.config.defaults.history_limit);
        self.store.city_history(city, limit).await
    }

    /// Newest stored reading for a city, without calling the provider
    pub async fn latest_reading(&self, city: &str) -> Result<Option<WeatherReading>> {
        let city = required_city(city)?;
        self.store.latest(city).await
    }

    pub async fn cities(&self) -> Result<Vec<CitySummary>> {
        self.store.cities().await
    }

    /// Insight over the last readings stored for a city
    #[instrument(skip(self))]
    pub async fn temperature_insight(&self, city: &str) -> Result<CityInsight> {
        let city = required_city(city)?;
        let mut readings = self.store.city_history(city, INSIGHT_READINGS).await?;
        let Some(newest) = readings.first() else {
            return Err(WeatherDashError::no_history(city));
        };
        let stored_city = newest.city.clone();

        readings.reverse();
        let temperatures: Vec<f64> = readings.iter().map(|r| r.temperature).collect();

        Ok(CityInsight {
            city: stored_city,
            insight: build_temperature_insight(&temperatures),
        })
    }

    /// Fetch the current weather, then analyze the readings of the recent window
    #[instrument(skip(self))]
    pub async fn temperature_trend(&self, city: &str) -> Result<TemperatureTrend> {
        let weather = self.fetch_and_record(city).await?;

        let window = chrono::Duration::hours(i64::from(self.config.defaults.recent_hours));
        // Readings are stored under the provider's canonical name
        let temperatures = self
            .store
            .recent_temperatures(&weather.city, Utc::now() - window)
            .await?;
        if temperatures.len() < 2 {
            return Err(WeatherDashError::InsufficientData {
                available: temperatures.len(),
            });
        }

        Ok(TemperatureTrend {
            city: weather.city,
            insight: build_temperature_insight(&temperatures),
        })
    }

    /// Thermal comfort for a city's current weather
    pub async fn thermal_comfort_for_city(&self, city: &str) -> Result<ThermalComfort> {
        let weather = self.fetch_and_record(city).await?;
        Ok(thermal_comfort(&ComfortInputs::from(&weather)))
    }

    async fn forecast(
        &self,
        location: &Location,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<DailyForecast>> {
        let key = location.forecast_cache_key();
        if let Some(key) = &key
            && let Some(forecast) = self.cached::<Vec<DailyForecast>>(key).await
        {
            return Ok(forecast);
        }

        let forecast = self
            .provider
            .forecast_by_coordinates(latitude, longitude)
            .await?;
        if let Some(key) = &key {
            self.store_cached(key, forecast.clone()).await;
        }
        Ok(forecast)
    }

    /// Current weather, forecast and comfort for the default location.
    /// Failures are reported in `error`; the first one wins.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Dashboard {
        let Some(location) = self.config.defaults.location.clone() else {
            return Dashboard {
                error: Some(
                    "No location configured. Please set a default location in your configuration."
                        .to_string(),
                ),
                ..Dashboard::default()
            };
        };
        let Some((latitude, longitude)) = location.coordinates() else {
            return Dashboard {
                location: Some(location),
                error: Some(
                    concat!(
                        "Location is missing geographic coordinates (latitude/longitude). ",
                        "Please update your location settings."
                    )
                    .to_string(),
                ),
                ..Dashboard::default()
            };
        };

        let mut dashboard = Dashboard::default();

        match self.provider.current_by_coordinates(latitude, longitude).await {
            Ok(weather) => dashboard.weather = Some(weather),
            Err(e) => {
                warn!(
                    "Current weather for {} ({}) failed: {e}",
                    location.name,
                    location.format_coordinates()
                );
                dashboard.error = Some(
                    "Unable to fetch current weather data. Please try again later.".to_string(),
                );
            }
        }

        match self.forecast(&location, latitude, longitude).await {
            Ok(forecast) => dashboard.forecast = forecast,
            Err(e) => {
                warn!(
                    "Forecast for {} ({}) failed: {e}",
                    location.name,
                    location.format_coordinates()
                );
                if dashboard.error.is_none() {
                    dashboard.error =
                        Some("Unable to fetch forecast data. Please try again later.".to_string());
                }
            }
        }

        dashboard.insights = dashboard.weather.as_ref().map(|weather| {
            let comfort = thermal_comfort(&ComfortInputs::from(weather));
            DashboardInsight {
                ui_level: comfort.level.ui_level(),
                comfort,
            }
        });
        dashboard.location = Some(location);
        dashboard
    }

    /// Search a city: record its current weather and chart its recent readings.
    /// Lookup failures are reported in `error` and the history is still returned.
    #[instrument(skip(self))]
    pub async fn home(&self, city: Option<&str>) -> Result<Home> {
        let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(Home::default());
        };

        let mut home = Home {
            city: Some(city.to_string()),
            ..Home::default()
        };

        let history_city = match self.fetch_and_record(city).await {
            Ok(weather) => {
                let stored = weather.city.clone();
                home.weather = Some(weather);
                stored
            }
            Err(e) => {
                warn!("Home lookup for {city} failed: {e}");
                home.error = Some(e.user_message());
                city.to_string()
            }
        };

        home.history = self
            .store
            .city_history(&history_city, INSIGHT_READINGS)
            .await?;
        for reading in home.history.iter().rev() {
            home.labels
                .push(reading.recorded_at.format(CHART_LABEL_FORMAT).to_string());
            home.temperatures.push(reading.temperature);
        }
        Ok(home)
    }

    /// Drop readings older than the configured retention
    pub async fn prune_history(&self) -> Result<usize> {
        let retention = chrono::Duration::days(i64::from(self.config.storage.retention_days));
        self.store.prune_older_than(Utc::now() - retention).await
    }
}

fn required_city(city: &str) -> Result<&str> {
    let city = city.trim();
    if city.is_empty() {
        Err(WeatherDashError::validation("city parameter is required"))
    } else {
        Ok(city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ComfortLevel, Trend};
    use crate::models::NewReading;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider returning canned weather, counting city lookups
    struct FakeProvider {
        temperatures: Mutex<Vec<f64>>,
        humidity: u8,
        fail_current: bool,
        fail_forecast: bool,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(temperatures: &[f64]) -> Self {
            Self {
                temperatures: Mutex::new(temperatures.to_vec()),
                humidity: 50,
                fail_current: false,
                fail_forecast: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn weather(&self, city: &str) -> CurrentWeather {
            let mut temperatures = self.temperatures.lock().unwrap();
            let temperature = if temperatures.len() > 1 {
                temperatures.remove(0)
            } else {
                temperatures.first().copied().unwrap_or(20.0)
            };
            CurrentWeather {
                city: city.to_string(),
                country: "GB".to_string(),
                temperature,
                feels_like: temperature - 1.0,
                humidity: self.humidity,
                condition: "clear sky".to_string(),
                wind_speed: 2.0,
                observed_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current_by_city(&self, city: &str) -> Result<CurrentWeather> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_current {
                return Err(WeatherDashError::api_unavailable("down"));
            }
            if city.eq_ignore_ascii_case("atlantis") {
                return Err(WeatherDashError::city_not_found(city));
            }
            Ok(self.weather(city))
        }

        async fn current_by_coordinates(&self, _: f64, _: f64) -> Result<CurrentWeather> {
            if self.fail_current {
                return Err(WeatherDashError::api_unavailable("down"));
            }
            Ok(self.weather("Lisbon"))
        }

        async fn forecast_by_coordinates(&self, _: f64, _: f64) -> Result<Vec<DailyForecast>> {
            if self.fail_forecast {
                return Err(WeatherDashError::api_unavailable("down"));
            }
            Ok(vec![DailyForecast {
                date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                avg_temp: 22.4,
                description: "clear sky".to_string(),
            }])
        }
    }

    fn service_with(provider: FakeProvider, cache: Option<PersistentCache>) -> WeatherService {
        service_with_config(provider, cache, WeatherDashConfig::default())
    }

    fn service_with_config(
        provider: FakeProvider,
        cache: Option<PersistentCache>,
        config: WeatherDashConfig,
    ) -> WeatherService {
        WeatherService::new(
            Arc::new(provider),
            cache,
            ReadingStore::open_in_memory().unwrap(),
            config,
        )
    }

    async fn seed(service: &WeatherService, city: &str, temperatures: &[f64]) {
        let start = Utc::now() - chrono::Duration::hours(2);
        for (i, temperature) in temperatures.iter().enumerate() {
            service
                .store()
                .insert(NewReading {
                    city: city.to_string(),
                    country: "GB".to_string(),
                    temperature: *temperature,
                    feels_like: *temperature,
                    humidity: 60,
                    condition: "clouds".to_string(),
                    recorded_at: start + chrono::Duration::minutes(i as i64),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_fetch_and_record_persists_reading() {
        let service = service_with(FakeProvider::new(&[18.5]), None);

        let weather = service.fetch_and_record("London").await.unwrap();
        assert_eq!(weather.temperature, 18.5);

        let history = service.city_history("  LONDON ", None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].city, "london");
        assert_eq!(history[0].temperature, 18.5);
    }

    #[tokio::test]
    async fn test_cache_hit_still_records() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let provider = Arc::new(FakeProvider::new(&[18.5]));
        let service = WeatherService::new(
            provider.clone(),
            Some(cache),
            ReadingStore::open_in_memory().unwrap(),
            WeatherDashConfig::default(),
        );

        service.fetch_and_record("London").await.unwrap();
        service.fetch_and_record("london").await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.city_history("london", None).await.unwrap().len(), 2);
    }

    #[test]
    fn test_cache_ttl_jitter_stays_within_ten_percent() {
        let mut config = WeatherDashConfig::default();
        config.cache.ttl_minutes = 10;
        let service = service_with_config(FakeProvider::new(&[18.5]), None, config);

        let base = Duration::from_secs(600);
        for _ in 0..200 {
            let ttl = service.cache_ttl();
            assert!(ttl >= base.mul_f64(0.9), "ttl too short: {ttl:?}");
            assert!(ttl <= base.mul_f64(1.1), "ttl too long: {ttl:?}");
        }
    }

    #[tokio::test]
    async fn test_latest_reading_reads_store_only() {
        let provider = Arc::new(FakeProvider::new(&[18.5]));
        let service = WeatherService::new(
            provider.clone(),
            None,
            ReadingStore::open_in_memory().unwrap(),
            WeatherDashConfig::default(),
        );
        assert!(service.latest_reading("Leeds").await.unwrap().is_none());

        seed(&service, "Leeds", &[11.0, 12.5]).await;
        let latest = service.latest_reading(" LEEDS ").await.unwrap().unwrap();
        assert_eq!(latest.temperature, 12.5);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let err = service.latest_reading("").await.unwrap_err();
        assert!(matches!(err, WeatherDashError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_blank_city() {
        let service = service_with(FakeProvider::new(&[18.5]), None);
        let err = service.fetch_and_record("   ").await.unwrap_err();
        assert!(matches!(err, WeatherDashError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_failed_lookup_records_nothing() {
        let service = service_with(FakeProvider::new(&[18.5]), None);
        let err = service.fetch_and_record("Atlantis").await.unwrap_err();
        assert!(matches!(err, WeatherDashError::CityNotFound { .. }));
        assert!(service.cities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_temperature_insight_uses_chronological_order() {
        let service = service_with(FakeProvider::new(&[0.0]), None);
        seed(&service, "Paris", &[15.0, 16.0, 17.5, 19.0]).await;

        let insight = service.temperature_insight("paris").await.unwrap();
        assert_eq!(insight.city, "paris");
        assert_eq!(insight.insight.analysis.trend, Trend::Up);
        assert_eq!(insight.insight.analysis.stats.unwrap().count, 4);
    }

    #[tokio::test]
    async fn test_temperature_insight_reads_last_ten() {
        let service = service_with(FakeProvider::new(&[0.0]), None);
        let temperatures: Vec<f64> = (0..15).map(f64::from).collect();
        seed(&service, "Oslo", &temperatures).await;

        let insight = service.temperature_insight("Oslo").await.unwrap();
        let stats = insight.insight.analysis.stats.unwrap();
        assert_eq!(stats.count, 10);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 14.0);
    }

    #[tokio::test]
    async fn test_temperature_insight_without_history() {
        let service = service_with(FakeProvider::new(&[0.0]), None);
        let err = service.temperature_insight("Nowhere").await.unwrap_err();
        assert!(matches!(err, WeatherDashError::NoHistory { .. }));
    }

    #[tokio::test]
    async fn test_temperature_trend_needs_two_readings() {
        let service = service_with(FakeProvider::new(&[20.0, 23.0]), None);

        let err = service.temperature_trend("Rome").await.unwrap_err();
        assert!(matches!(
            err,
            WeatherDashError::InsufficientData { available: 1 }
        ));

        let trend = service.temperature_trend("Rome").await.unwrap();
        assert_eq!(trend.city, "Rome");
        assert_eq!(trend.insight.analysis.trend, Trend::Up);
    }

    #[tokio::test]
    async fn test_temperature_trend_ignores_old_readings() {
        let service = service_with(FakeProvider::new(&[21.0]), None);
        service
            .store()
            .insert(NewReading {
                city: "Rome".to_string(),
                country: "IT".to_string(),
                temperature: 5.0,
                feels_like: 5.0,
                humidity: 60,
                condition: "clouds".to_string(),
                recorded_at: Utc::now() - chrono::Duration::hours(48),
            })
            .await
            .unwrap();

        let err = service.temperature_trend("Rome").await.unwrap_err();
        assert!(matches!(
            err,
            WeatherDashError::InsufficientData { available: 1 }
        ));
    }

    #[tokio::test]
    async fn test_thermal_comfort_for_city() {
        let mut provider = FakeProvider::new(&[32.0]);
        provider.humidity = 80;
        let service = service_with(provider, None);

        let comfort = service.thermal_comfort_for_city("Manaus").await.unwrap();
        assert_eq!(comfort.level, ComfortLevel::Low);
    }

    #[tokio::test]
    async fn test_dashboard_without_location() {
        let service = service_with(FakeProvider::new(&[20.0]), None);
        let dashboard = service.dashboard().await;
        assert!(dashboard.location.is_none());
        assert!(dashboard.error.unwrap().starts_with("No location configured"));
    }

    #[tokio::test]
    async fn test_dashboard_location_without_coordinates() {
        let mut config = WeatherDashConfig::default();
        config.defaults.location = Some(Location::new("Lisbon"));
        let service = service_with_config(FakeProvider::new(&[20.0]), None, config);

        let dashboard = service.dashboard().await;
        assert!(dashboard.location.is_some());
        assert!(dashboard.weather.is_none());
        assert!(dashboard.error.unwrap().contains("coordinates"));
    }

    #[tokio::test]
    async fn test_dashboard_success() {
        let mut config = WeatherDashConfig::default();
        config.defaults.location = Some(Location::with_coordinates("Lisbon", 38.72, -9.14));
        let service = service_with_config(FakeProvider::new(&[24.0]), None, config);

        let dashboard = service.dashboard().await;
        assert!(dashboard.error.is_none());
        assert_eq!(dashboard.weather.unwrap().temperature, 24.0);
        assert_eq!(dashboard.forecast.len(), 1);
        let insights = dashboard.insights.unwrap();
        assert_eq!(insights.comfort.level, ComfortLevel::Moderate);
        assert_eq!(insights.ui_level, "good");
    }

    #[tokio::test]
    async fn test_dashboard_current_weather_error_wins() {
        let mut config = WeatherDashConfig::default();
        config.defaults.location = Some(Location::with_coordinates("Lisbon", 38.72, -9.14));
        let mut provider = FakeProvider::new(&[24.0]);
        provider.fail_current = true;
        provider.fail_forecast = true;
        let service = service_with_config(provider, None, config);

        let dashboard = service.dashboard().await;
        assert!(dashboard.weather.is_none());
        assert!(dashboard.insights.is_none());
        assert!(dashboard.forecast.is_empty());
        assert_eq!(
            dashboard.error.as_deref(),
            Some("Unable to fetch current weather data. Please try again later.")
        );
    }

    #[tokio::test]
    async fn test_dashboard_forecast_error_only() {
        let mut config = WeatherDashConfig::default();
        config.defaults.location = Some(Location::with_coordinates("Lisbon", 38.72, -9.14));
        let mut provider = FakeProvider::new(&[24.0]);
        provider.fail_forecast = true;
        let service = service_with_config(provider, None, config);

        let dashboard = service.dashboard().await;
        assert!(dashboard.weather.is_some());
        assert!(dashboard.insights.is_some());
        assert_eq!(
            dashboard.error.as_deref(),
            Some("Unable to fetch forecast data. Please try again later.")
        );
    }

    #[tokio::test]
    async fn test_home_without_city() {
        let service = service_with(FakeProvider::new(&[20.0]), None);
        let home = service.home(None).await.unwrap();
        assert!(home.city.is_none());
        assert!(home.history.is_empty());
        assert!(home.labels.is_empty());
    }

    #[tokio::test]
    async fn test_home_chart_is_oldest_first() {
        let service = service_with(FakeProvider::new(&[21.0]), None);
        let start = Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap();
        for (i, temperature) in [12.0, 14.0].iter().enumerate() {
            service
                .store()
                .insert(NewReading {
                    city: "Berlin".to_string(),
                    country: "DE".to_string(),
                    temperature: *temperature,
                    feels_like: *temperature,
                    humidity: 60,
                    condition: "clouds".to_string(),
                    recorded_at: start + chrono::Duration::hours(i as i64),
                })
                .await
                .unwrap();
        }

        let home = service.home(Some("Berlin")).await.unwrap();
        assert!(home.error.is_none());
        assert_eq!(home.history.len(), 3);
        assert_eq!(home.history[0].temperature, 21.0);
        assert_eq!(home.labels[0], "05/03 08:30");
        assert_eq!(home.labels[1], "05/03 09:30");
        assert_eq!(home.temperatures, vec![12.0, 14.0, 21.0]);
    }

    #[tokio::test]
    async fn test_home_reports_lookup_error() {
        let service = service_with(FakeProvider::new(&[21.0]), None);
        let home = service.home(Some("Atlantis")).await.unwrap();
        assert!(home.weather.is_none());
        assert_eq!(home.error.as_deref(), Some("City 'Atlantis' not found."));
        assert!(home.history.is_empty());
    }

    #[tokio::test]
    async fn test_prune_history() {
        let service = service_with(FakeProvider::new(&[21.0]), None);
        service
            .store()
            .insert(NewReading {
                city: "Rome".to_string(),
                country: "IT".to_string(),
                temperature: 5.0,
                feels_like: 5.0,
                humidity: 60,
                condition: "clouds".to_string(),
                recorded_at: Utc::now() - chrono::Duration::days(400),
            })
            .await
            .unwrap();
        service.fetch_and_record("Rome").await.unwrap();

        assert_eq!(service.prune_history().await.unwrap(), 1);
        assert_eq!(service.city_history("rome", None).await.unwrap().len(), 1);
    }
}
