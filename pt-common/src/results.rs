//! Append-only results log
//!
//! One CSV row per submitted judgment with columns `Source,Rating,Guess,Path`.
//! The header is written only when the log is created (or was left empty).
//! Rows are never rewritten or deleted.

use crate::poem::Category;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Lowest accepted quality rating
pub const MIN_RATING: u8 = 1;
/// Highest accepted quality rating
pub const MAX_RATING: u8 = 10;

/// One submitted judgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// True origin of the poem
    #[serde(rename = "Source")]
    pub source: Category,
    /// Quality rating (1-10)
    #[serde(rename = "Rating")]
    pub rating: u8,
    /// Reader's guess of the origin
    #[serde(rename = "Guess")]
    pub guess: Category,
    /// Poem path as produced by `poem::log_path`
    #[serde(rename = "Path")]
    pub path: String,
}

impl ResultEntry {
    pub fn new(source: Category, rating: u8, guess: Category, path: impl Into<String>) -> Self {
        Self {
            source,
            rating,
            guess,
            path: path.into(),
        }
    }

    /// Whether the guess matched the true origin
    pub fn is_correct(&self) -> bool {
        self.guess == self.source
    }

    /// Reject ratings outside 1..=10
    pub fn validate(&self) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(Error::InvalidInput(format!(
                "Rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, self.rating
            )));
        }
        Ok(())
    }
}

/// State of the results log at read time
#[derive(Debug, Clone, PartialEq)]
pub enum LogSnapshot {
    /// No log file exists yet
    Missing,
    /// Log file exists but has zero bytes
    Empty,
    /// Rows matching the requested path (may be none)
    Entries(Vec<ResultEntry>),
}

impl LogSnapshot {
    /// Matching entries, empty for a missing or empty log
    pub fn entries(&self) -> &[ResultEntry] {
        match self {
            LogSnapshot::Entries(entries) => entries,
            LogSnapshot::Missing | LogSnapshot::Empty => &[],
        }
    }
}

/// CSV-backed results log
///
/// Clones share one writer lock, so appends from concurrent handlers in the
/// same process never interleave. Other processes writing the same file are
/// not coordinated.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, writing the header first if the log is absent or empty
    pub fn append(&self, entry: &ResultEntry) -> Result<()> {
        entry.validate()?;

        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Internal("Results log lock poisoned".to_string()))?;

        let needs_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let file = if needs_header {
            File::create(&self.path)?
        } else {
            OpenOptions::new().append(true).open(&self.path)?
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(entry)?;
        writer.flush()?;

        info!(
            "Recorded {} rating {} guess {} for {}",
            entry.source, entry.rating, entry.guess, entry.path
        );
        Ok(())
    }

    /// Load the log and keep rows whose Path equals `path`
    ///
    /// Rows that fail to parse are skipped with a warning.
    pub fn filter_by_path(&self, path: &str) -> Result<LogSnapshot> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Internal("Results log lock poisoned".to_string()))?;

        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.len() == 0 => return Ok(LogSnapshot::Empty),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Results log {} not created yet", self.path.display());
                return Ok(LogSnapshot::Missing);
            }
            Err(e) => return Err(e.into()),
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let mut matches = Vec::new();
        for (index, row) in reader.deserialize::<ResultEntry>().enumerate() {
            match row {
                Ok(entry) if entry.path == path => matches.push(entry),
                Ok(_) => {}
                // Data rows start on line 2
                Err(e) => warn!("Skipping malformed results row {}: {}", index + 2, e),
            }
        }

        Ok(LogSnapshot::Entries(matches))
    }
}
