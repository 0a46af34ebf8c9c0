//! JSON statistics and author lookup

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use pt_common::authors::author_by_poem_number;
use pt_common::{LogSnapshot, PoemStats};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// Query parameters for poem statistics
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Poem path as stored in the results log, e.g. `./real_poems/7.txt`
    pub path: String,
}

/// Statistics for one poem
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub path: String,
    /// "missing", "empty" or "present"
    pub log: &'static str,
    pub stats: PoemStats,
}

/// GET /api/stats?path=./real_poems/7.txt
pub async fn get_poem_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<StatsResponse>> {
    let snapshot = state.snapshot(&query.path).await?;
    let log = match snapshot {
        LogSnapshot::Missing => "missing",
        LogSnapshot::Empty => "empty",
        LogSnapshot::Entries(_) => "present",
    };

    Ok(Json(StatsResponse {
        stats: PoemStats::from_snapshot(&snapshot),
        path: query.path,
        log,
    }))
}

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub poem_number: u32,
    pub author: &'static str,
}

/// GET /api/authors/:number
///
/// Author of a human poem by number; "Unknown" outside the collection.
pub async fn get_author(Path(poem_number): Path<u32>) -> Json<AuthorResponse> {
    Json(AuthorResponse {
        poem_number,
        author: author_by_poem_number(poem_number),
    })
}

/// Build statistics routes
pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(get_poem_stats))
        .route("/api/authors/:number", get(get_author))
}
