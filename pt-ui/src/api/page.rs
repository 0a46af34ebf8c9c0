//! Poem page handlers
//!
//! GET / shows the session's poem (drawing one for a new session), POST /new
//! draws another, POST /submit records a judgment and renders the feedback.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use pt_common::results::{MAX_RATING, MIN_RATING};
use pt_common::Category;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::render::{render_page, PageView};
use crate::session::{session_cookie_header, Session, SessionCookie};
use crate::AppState;

/// Form posted by the judgment controls
///
/// Fields are taken as text so malformed values reach [`parse_rating`] and
/// get the JSON error body instead of a form rejection.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    /// Quality rating (1-10)
    #[serde(default)]
    pub rating: String,
    /// "Human" or "AI"
    #[serde(default)]
    pub guess: String,
}

/// Parse a posted rating, accepting only whole numbers in 1..=10
pub fn parse_rating(raw: &str) -> ApiResult<u8> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Rating must be a number, got '{}'", raw)))?;

    if !(i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
        return Err(ApiError::BadRequest(format!(
            "Rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, value
        )));
    }
    Ok(value as u8)
}

/// Attach the session cookie when the session was just created
fn with_session_cookie(response: impl IntoResponse, id: Uuid, created: bool) -> Response {
    let mut response = response.into_response();
    if created {
        if let Ok(value) = HeaderValue::from_str(&session_cookie_header(id)) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// GET /
///
/// A redisplayed poem shows its statistics; a freshly drawn one does not.
pub async fn index_page(
    State(state): State<AppState>,
    SessionCookie(cookie): SessionCookie,
) -> ApiResult<Response> {
    let (id, created) = state.sessions.get_or_create(cookie).await;

    let needs_poem = state.sessions.with_session(id, |s| s.needs_poem()).await;
    if needs_poem {
        let poem = state.draw_poem().await?;
        state.sessions.with_session(id, |s| s.show(poem)).await;
    }

    let (session, fresh): (Session, bool) = state
        .sessions
        .with_session(id, |s| {
            let fresh = s.take_fresh();
            (s.clone(), fresh)
        })
        .await;

    let stats_lines = match session.current() {
        Some(poem) if !fresh => state.poem_stats(&poem.path).await?.display_lines(),
        _ => Vec::new(),
    };

    let html = render_page(&PageView {
        poem: session.current(),
        phase: Some(session.phase()),
        stats_lines,
        submission: None,
    });

    Ok(with_session_cookie(Html(html), id, created))
}

/// POST /new
///
/// "Show new poem": draw a poem and return to the page.
pub async fn new_poem(
    State(state): State<AppState>,
    SessionCookie(cookie): SessionCookie,
) -> ApiResult<Response> {
    let (id, created) = state.sessions.get_or_create(cookie).await;

    let poem = state.draw_poem().await?;
    state.sessions.with_session(id, |s| s.show(poem)).await;

    Ok(with_session_cookie(Redirect::to("/"), id, created))
}

/// POST /submit
///
/// Record the judgment for the current poem and show the verdict.
pub async fn submit_judgment(
    State(state): State<AppState>,
    SessionCookie(cookie): SessionCookie,
    Form(form): Form<SubmitForm>,
) -> ApiResult<Response> {
    let guess: Category = form.guess.parse()?;
    let rating = parse_rating(&form.rating)?;
    let (id, created) = state.sessions.get_or_create(cookie).await;

    let submission = state
        .sessions
        .with_session(id, |s| s.begin_submission(rating, guess))
        .await?;

    if let Err(e) = state.record(submission.entry.clone()).await {
        let path = &submission.entry.path;
        let reopened = state.sessions.with_session(id, |s| s.reopen(path)).await;
        warn!(
            "Recording judgment for {} failed (reopened: {}): {}",
            path, reopened, e
        );
        return Err(e);
    }

    info!(
        "Session {} judged {}: {}",
        id,
        submission.entry.path,
        submission.verdict()
    );

    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::Internal(format!("Session {} disappeared", id)))?;
    let stats_lines = state
        .poem_stats(&submission.entry.path)
        .await?
        .display_lines();

    let html = render_page(&PageView {
        poem: session.current(),
        phase: Some(session.phase()),
        stats_lines,
        submission: Some(&submission),
    });

    Ok(with_session_cookie(Html(html), id, created))
}

/// Build page routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_page))
        .route("/new", post(new_poem))
        .route("/submit", post(submit_judgment))
}
