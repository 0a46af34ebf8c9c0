//! Liveness report for the poem page service

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

const SERVICE_NAME: &str = "pt-ui";

/// Body of GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process answers requests
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    /// Visitor sessions currently held in memory
    pub active_sessions: usize,
}

/// GET /health
///
/// Reports uptime and how many visitor sessions survived eviction.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime_seconds = Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0) as u64;

    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds,
        active_sessions: state.sessions.len().await,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
