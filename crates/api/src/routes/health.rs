use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the media root exists and is a directory.
    pub media_writable: bool,
}

/// GET /health -- returns service, database and media root health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = arstudio_db::health_check(&state.pool).await.is_ok();
    let media_writable = tokio::fs::metadata(state.storage.root())
        .await
        .map(|m| m.is_dir() && !m.permissions().readonly())
        .unwrap_or(false);

    let status = if db_healthy && media_writable {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        media_writable,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
