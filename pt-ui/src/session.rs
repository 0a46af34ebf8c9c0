//! Per-visitor session state
//!
//! Each browser session carries a UUID in the `pt_session` cookie. The
//! matching [`Session`] remembers which poem is on screen and whether the
//! visitor already submitted a judgment for it:
//!
//! ```text
//! Init --show--> Showing --submit--> Submitted --show--> Showing
//!                   ^  |
//!                   +--+ show
//! ```
//!
//! Sessions live in memory only and are lost on restart. Sessions idle for
//! longer than the store's timeout are evicted when new sessions are created,
//! and the store never holds more than its configured maximum.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use pt_common::authors::author_of;
use pt_common::{Category, PoemRecord, ResultEntry};
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "pt_session";

/// Idle time after which a session may be evicted
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Upper bound on sessions held in memory
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Where a session is in the show/submit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No poem shown yet
    Init,
    /// A poem is on screen awaiting a judgment
    Showing,
    /// The judgment for the current poem was recorded
    Submitted,
}

/// Rejected session transitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No poem is being shown")]
    NoPoem,

    #[error("Feedback for this poem was already submitted")]
    AlreadySubmitted,
}

/// Outcome of a judgment, used for the feedback text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub entry: ResultEntry,
    pub correct: bool,
    /// Author of a human poem; `None` for AI poems
    pub author: Option<&'static str>,
}

impl Submission {
    pub fn verdict(&self) -> &'static str {
        if self.correct {
            "Correct"
        } else {
            "Incorrect"
        }
    }
}

/// State of one visitor
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    current: Option<PoemRecord>,
    /// Set by `show`, cleared by the first page render of that poem
    fresh: bool,
    last_seen: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::seen_at(Instant::now())
    }

    fn seen_at(now: Instant) -> Self {
        Self {
            phase: Phase::Init,
            current: None,
            fresh: false,
            last_seen: now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current(&self) -> Option<&PoemRecord> {
        self.current.as_ref()
    }

    /// Whether the next page view must draw a poem
    pub fn needs_poem(&self) -> bool {
        self.phase == Phase::Init
    }

    /// Report and clear freshness; called when the page is rendered
    pub fn take_fresh(&mut self) -> bool {
        std::mem::replace(&mut self.fresh, false)
    }

    /// Put a freshly drawn poem on screen
    pub fn show(&mut self, poem: PoemRecord) {
        self.current = Some(poem);
        self.phase = Phase::Showing;
        self.fresh = true;
    }

    /// Build the judgment for the current poem without changing state
    ///
    /// Only valid while a poem is showing.
    pub fn prepare_submission(
        &self,
        rating: u8,
        guess: Category,
    ) -> Result<Submission, SessionError> {
        let poem = match (self.phase, &self.current) {
            (Phase::Showing, Some(poem)) => poem,
            (Phase::Submitted, _) => return Err(SessionError::AlreadySubmitted),
            _ => return Err(SessionError::NoPoem),
        };

        let entry = ResultEntry::new(poem.category, rating, guess, poem.path.clone());
        let author = match poem.category {
            Category::Human => Some(author_of(poem.category, poem.id)),
            Category::Ai => None,
        };

        Ok(Submission {
            correct: entry.is_correct(),
            entry,
            author,
        })
    }

    /// Claim the judgment for the current poem
    ///
    /// Moves to Submitted before the entry is written, so a second submit
    /// racing this one is rejected. Use [`Session::reopen`] if the write fails.
    pub fn begin_submission(
        &mut self,
        rating: u8,
        guess: Category,
    ) -> Result<Submission, SessionError> {
        let submission = self.prepare_submission(rating, guess)?;
        self.mark_submitted();
        Ok(submission)
    }

    /// Record that the judgment was persisted
    pub fn mark_submitted(&mut self) {
        if self.phase == Phase::Showing {
            self.phase = Phase::Submitted;
            self.fresh = false;
        }
    }

    /// Return to Showing after a failed write, if the same poem is still current
    ///
    /// Returns false when the visitor moved on to another poem meanwhile.
    pub fn reopen(&mut self, path: &str) -> bool {
        let same_poem = self.current.as_ref().is_some_and(|poem| poem.path == path);
        if self.phase == Phase::Submitted && same_poem {
            self.phase = Phase::Showing;
            true
        } else {
            false
        }
    }
}

/// All live sessions, shared by every handler
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }

    /// Store with explicit idle timeout and capacity (at least one session)
    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Return the id of a known session, or create a new one
    ///
    /// The flag is true when a new session was created and the cookie must
    /// be (re)issued.
    pub async fn get_or_create(&self, requested: Option<Uuid>) -> (Uuid, bool) {
        self.get_or_create_at(requested, Instant::now()).await
    }

    async fn get_or_create_at(&self, requested: Option<Uuid>, now: Instant) -> (Uuid, bool) {
        let mut sessions = self.sessions.write().await;
        if let Some(id) = requested {
            if let Some(session) = sessions.get_mut(&id) {
                session.last_seen = now;
                return (id, false);
            }
        }

        self.evict(&mut sessions, now);

        let id = Uuid::new_v4();
        sessions.insert(id, Session::seen_at(now));
        debug!("Created session {} ({} live)", id, sessions.len());
        (id, true)
    }

    /// Drop idle sessions, then the least recently seen ones until a new
    /// session fits under the cap
    fn evict(&self, sessions: &mut HashMap<Uuid, Session>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.last_seen) < self.idle_timeout);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} sessions", evicted);
        }
    }

    /// Snapshot of a session
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Run a closure against a session under the write lock
    ///
    /// Keep the closure free of I/O: the lock covers every session.
    pub async fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id).or_default();
        f(session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Session id taken from the request cookie, if any
#[derive(Debug, Clone, Copy)]
pub struct SessionCookie(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Uuid::parse_str(value).ok());

        Ok(SessionCookie(id))
    }
}

/// `Set-Cookie` value for a session id
pub fn session_cookie_header(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}
