use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{Json, Router, http::StatusCode, routing::get};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::{VERSION, WeatherService, api};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: VERSION,
    })
}

/// Full HTTP application: `/health` plus the JSON API under `/api`
pub fn app(service: Arc<WeatherService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let timeout = Duration::from_secs(u64::from(
        service.config().server.request_timeout_seconds,
    ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api::router(service))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(cors)
}

pub async fn run(service: Arc<WeatherService>, port: u16) -> Result<()> {
    let addr = format!("{}:{}", service.config().server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;
    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ComfortLevel;
    use crate::config::WeatherDashConfig;
    use crate::history::ReadingStore;
    use crate::models::{CurrentWeather, DailyForecast};
    use crate::weather::WeatherProvider;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct Unreachable;

    #[async_trait]
    impl WeatherProvider for Unreachable {
        async fn current_by_city(&self, _: &str) -> crate::Result<CurrentWeather> {
            Err(crate::WeatherDashError::api_unavailable("offline"))
        }

        async fn current_by_coordinates(&self, _: f64, _: f64) -> crate::Result<CurrentWeather> {
            Err(crate::WeatherDashError::api_unavailable("offline"))
        }

        async fn forecast_by_coordinates(
            &self,
            _: f64,
            _: f64,
        ) -> crate::Result<Vec<DailyForecast>> {
            Err(crate::WeatherDashError::api_unavailable("offline"))
        }
    }

    fn test_app() -> Router {
        app(Arc::new(WeatherService::new(
            Arc::new(Unreachable),
            None,
            ReadingStore::open_in_memory().unwrap(),
            WeatherDashConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
    }

    #[tokio::test]
    async fn test_api_is_nested() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/insights/thermal-comfort?temperature=20&humidity=50")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let comfort: crate::ThermalComfort = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(comfort.level, ComfortLevel::Moderate);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = test_app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upstream_outage_is_service_unavailable() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/weather?city=Paris")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
