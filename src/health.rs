// src/health.rs

//! Liveness endpoint.
//!
//! `GET /health` answers `200 {"status":"ok"}` while the process serves
//! requests. With probing enabled, each request also fetches the source
//! page and answers `500 {"status":"error"}` if that fails. The handler
//! never touches the snapshot store.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::error::{AppError, Result};
use crate::services::Fetcher;

/// Body of every health response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Active probe of the source page.
#[derive(Clone)]
pub struct Probe {
    pub fetcher: Arc<dyn Fetcher>,
    pub url: String,
}

#[derive(Clone, Default)]
pub struct HealthState {
    probe: Option<Probe>,
}

impl HealthState {
    /// Static "ok" responder.
    pub fn passive() -> Self {
        Self { probe: None }
    }

    /// Re-fetch `url` on every request.
    pub fn probing(fetcher: Arc<dyn Fetcher>, url: impl Into<String>) -> Self {
        Self {
            probe: Some(Probe {
                fetcher,
                url: url.into(),
            }),
        }
    }
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let Some(probe) = state.probe else {
        return ok();
    };

    match probe.fetcher.fetch(&probe.url).await {
        Ok(_) => ok(),
        Err(e) => {
            log::warn!("Health probe failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error".to_string(),
                    message: e.to_string(),
                }),
            )
        }
    }
}

fn ok() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            message: "Service is running".to_string(),
        }),
    )
}

/// Bind the health listener.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::config(format!("cannot listen on {addr}: {e}")))
}

/// Serve health requests on `listener` until the task is dropped.
pub async fn serve(listener: TcpListener, state: HealthState) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Health endpoint listening on http://{addr}/health");
    }
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::FakeFetcher;

    async fn spawn(state: HealthState) -> String {
        let listener = bind("127.0.0.1", 0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state));
        format!("http://{addr}/health")
    }

    async fn get_health(url: &str) -> (u16, HealthResponse) {
        let response = reqwest::get(url).await.unwrap();
        let status = response.status().as_u16();
        let body: HealthResponse = serde_json::from_str(&response.text().await.unwrap()).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_passive_is_ok() {
        let url = spawn(HealthState::passive()).await;

        let (status, body) = get_health(&url).await;
        assert_eq!(status, 200);
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_probe_success_is_ok() {
        let fetcher = Arc::new(FakeFetcher::page("<html></html>".to_string()));
        let url = spawn(HealthState::probing(fetcher.clone(), "https://results.example/")).await;

        let (status, body) = get_health(&url).await;
        assert_eq!(status, 200);
        assert_eq!(body.status, "ok");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_is_500() {
        let fetcher = Arc::new(FakeFetcher::down());
        let url = spawn(HealthState::probing(fetcher, "https://results.example/")).await;

        let (status, body) = get_health(&url).await;
        assert_eq!(status, 500);
        assert_eq!(body.status, "error");
        assert!(body.message.contains("connection refused"));
    }
}
