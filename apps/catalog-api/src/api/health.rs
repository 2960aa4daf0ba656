//! Health check endpoints

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use database::HealthStatus;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Serialize)]
struct ComponentStatus {
    backend: &'static str,
    healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    response_time_ms: u64,
}

impl ComponentStatus {
    fn new(backend: &'static str, status: HealthStatus) -> Self {
        Self {
            backend,
            healthy: status.healthy,
            message: status.message,
            response_time_ms: status.response_time_ms,
        }
    }
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    store: ComponentStatus,
    cache: ComponentStatus,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "catalog-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 503 only when the store is down; a lost cache degrades to direct reads
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (store, cache) = tokio::join!(state.store.probe(), state.cache.probe());
    let store = ComponentStatus::new(state.store.name(), store);
    let cache = ComponentStatus::new(state.cache.name(), cache);

    let (code, status) = match (store.healthy, cache.healthy) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        (true, false) => (StatusCode::OK, "degraded"),
        (true, true) => (StatusCode::OK, "ready"),
    };
    if code != StatusCode::OK {
        tracing::error!(store = ?store.message, "Readiness check failed");
    }

    (code, Json(ReadyResponse { status, store, cache }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}
