//! JSON API routes, nested under `/api` by the web server

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::WeatherDashError;
use crate::analysis::{ComfortInputs, ThermalComfort, thermal_comfort};
use crate::history::CitySummary;
use crate::models::{CurrentWeather, WeatherReading};
use crate::service::{CityInsight, Dashboard, Home, TemperatureTrend, WeatherService};

/// Largest `limit` accepted by the history endpoint
pub const MAX_HISTORY_LIMIT: u32 = 100;

pub type AppState = Arc<WeatherService>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by every handler, rendered as `{"error": ...}`
#[derive(Debug)]
pub struct ApiError(WeatherDashError);

impl From<WeatherDashError> for ApiError {
    fn from(err: WeatherDashError) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(WeatherDashError::validation(rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            WeatherDashError::Validation { .. } => StatusCode::BAD_REQUEST,
            WeatherDashError::CityNotFound { .. } | WeatherDashError::NoHistory { .. } => {
                StatusCode::NOT_FOUND
            }
            WeatherDashError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WeatherDashError::ApiAuth { .. } => StatusCode::BAD_GATEWAY,
            WeatherDashError::ApiUnavailable { .. } | WeatherDashError::InvalidResponse { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            WeatherDashError::Validation { message } => message.clone(),
            err if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!("Request failed: {err}");
                "Internal server error".to_string()
            }
            err => {
                if err.is_upstream() {
                    warn!("Weather provider failure: {err}");
                }
                err.user_message()
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub city: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ComfortQuery {
    pub city: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/history", get(get_history))
        .route("/cities", get(get_cities))
        .route("/v1/insights/temperature", get(get_temperature_insight))
        .route("/insights/temperature-trend", get(get_temperature_trend))
        .route("/insights/thermal-comfort", get(get_thermal_comfort))
        .route("/dashboard", get(get_dashboard))
        .route("/home", get(get_home))
        .with_state(service)
}

async fn get_weather(
    State(service): State<AppState>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> ApiResult<CurrentWeather> {
    let Query(query) = query?;
    let city = query.city.unwrap_or_default();
    Ok(Json(service.fetch_and_record(&city).await?))
}

async fn get_history(
    State(service): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Vec<WeatherReading>> {
    let Query(query) = query?;
    let city = query.city.unwrap_or_default();
    if let Some(limit) = query.limit
        && !(1..=MAX_HISTORY_LIMIT).contains(&limit)
    {
        return Err(WeatherDashError::validation(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}"
        ))
        .into());
    }
    Ok(Json(service.city_history(&city, query.limit).await?))
}

async fn get_cities(State(service): State<AppState>) -> ApiResult<Vec<CitySummary>> {
    Ok(Json(service.cities().await?))
}

async fn get_temperature_insight(
    State(service): State<AppState>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> ApiResult<CityInsight> {
    let Query(query) = query?;
    let city = query.city.unwrap_or_default();
    Ok(Json(service.temperature_insight(&city).await?))
}

async fn get_temperature_trend(
    State(service): State<AppState>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> ApiResult<TemperatureTrend> {
    let Query(query) = query?;
    let city = query.city.unwrap_or_default();
    Ok(Json(service.temperature_trend(&city).await?))
}

/// Comfort for a city's current weather, or for readings given in the query
async fn get_thermal_comfort(
    State(service): State<AppState>,
    query: Result<Query<ComfortQuery>, QueryRejection>,
) -> ApiResult<ThermalComfort> {
    let Query(query) = query?;
    match query.city.filter(|c| !c.trim().is_empty()) {
        Some(city) => Ok(Json(service.thermal_comfort_for_city(&city).await?)),
        None => Ok(Json(thermal_comfort(&ComfortInputs {
            temperature: query.temperature,
            humidity: query.humidity,
            wind_speed: query.wind_speed,
        }))),
    }
}

async fn get_dashboard(State(service): State<AppState>) -> Json<Dashboard> {
    Json(service.dashboard().await)
}

async fn get_home(
    State(service): State<AppState>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> ApiResult<Home> {
    let Query(query) = query?;
    Ok(Json(service.home(query.city.as_deref()).await?))
}
