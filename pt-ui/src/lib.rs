//! pt-ui library - Poem Turing test web service
//!
//! Shows a random human-written or AI-generated poem, collects a rating and
//! a Human/AI guess, and appends the judgment to the results log.

use axum::Router;
use chrono::{DateTime, Utc};
use pt_common::config::ServiceConfig;
use pt_common::{LogSnapshot, PoemRecord, PoemRepository, PoemStats, ResultEntry, ResultStore};
use std::path::PathBuf;
use std::time::Duration;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod render;
pub mod session;

pub use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Poem files under the root folder
    pub poems: PoemRepository,
    /// Append-only results log
    pub results: ResultStore,
    /// Per-visitor sessions
    pub sessions: SessionStore,
    /// Logo image served at /logo.png
    pub logo_path: PathBuf,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state with default session limits
    pub fn new(poems: PoemRepository, results: ResultStore, logo_path: PathBuf) -> Self {
        Self::with_sessions(poems, results, logo_path, SessionStore::new())
    }

    /// Create new application state around an existing session store
    pub fn with_sessions(
        poems: PoemRepository,
        results: ResultStore,
        logo_path: PathBuf,
        sessions: SessionStore,
    ) -> Self {
        Self {
            poems,
            results,
            sessions,
            logo_path,
            startup_time: Utc::now(),
        }
    }

    /// Create application state from resolved configuration
    pub fn from_config(config: &ServiceConfig) -> Self {
        let poems = PoemRepository::with_counts(
            &config.root_folder,
            config.human_poem_count,
            config.ai_poem_count,
        );
        let results = ResultStore::new(&config.results_path);
        let sessions = SessionStore::with_limits(
            Duration::from_secs(config.session_idle_secs),
            config.max_sessions,
        );
        Self::with_sessions(poems, results, config.logo_path(), sessions)
    }

    /// Draw a random poem from either category
    pub async fn draw_poem(&self) -> ApiResult<PoemRecord> {
        let poems = self.poems.clone();
        run_blocking(move || poems.draw(&mut rand::thread_rng())).await
    }

    /// Results log rows for one poem path
    pub async fn snapshot(&self, path: &str) -> ApiResult<LogSnapshot> {
        let results = self.results.clone();
        let path = path.to_string();
        run_blocking(move || results.filter_by_path(&path)).await
    }

    /// Statistics for one poem path
    pub async fn poem_stats(&self, path: &str) -> ApiResult<PoemStats> {
        let snapshot = self.snapshot(path).await?;
        Ok(PoemStats::from_snapshot(&snapshot))
    }

    /// Append one judgment to the results log
    pub async fn record(&self, entry: ResultEntry) -> ApiResult<()> {
        let results = self.results.clone();
        run_blocking(move || results.append(&entry)).await
    }
}

/// Run file I/O on the blocking thread pool
async fn run_blocking<T, F>(task: F) -> ApiResult<T>
where
    F: FnOnce() -> pt_common::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let logo = ServeFile::new(&state.logo_path);

    Router::new()
        .merge(api::page_routes())
        .merge(api::stats_routes())
        .merge(api::health_routes())
        .route_service("/logo.png", logo)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
