//! Poem categories and the on-disk poem repository
//!
//! Poems live as numbered text files under the root folder:
//! - `real_poems/{1..N}.txt` for human-written poems
//! - `fake_poems/{1..N}.txt` for AI-generated poems

use crate::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Default number of poems in each category folder
pub const DEFAULT_POEM_COUNT: u32 = 100;

/// Origin of a poem, also used for the reader's guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Human")]
    Human,
    #[serde(rename = "AI")]
    Ai,
}

impl Category {
    /// Label used in the results log and on the page
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Human => "Human",
            Category::Ai => "AI",
        }
    }

    /// Folder (relative to the root folder) holding this category's poems
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Human => "real_poems",
            Category::Ai => "fake_poems",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Human" => Ok(Category::Human),
            "AI" => Ok(Category::Ai),
            other => Err(Error::InvalidInput(format!(
                "Unknown category '{}', expected 'Human' or 'AI'",
                other
            ))),
        }
    }
}

/// A poem loaded from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoemRecord {
    /// Poem number within its category (1-indexed)
    pub id: u32,
    pub category: Category,
    /// Path as recorded in the results log, e.g. `./real_poems/7.txt`
    pub path: String,
    pub text: String,
}

/// Build the results-log path for a poem
///
/// Kept in `./{dir}/{n}.txt` form so existing logs stay comparable.
pub fn log_path(category: Category, id: u32) -> String {
    format!("./{}/{}.txt", category.dir_name(), id)
}

/// Reads poems from the category folders under a root folder
#[derive(Debug, Clone)]
pub struct PoemRepository {
    root_folder: PathBuf,
    human_count: u32,
    ai_count: u32,
}

impl PoemRepository {
    /// Create a repository with the default poem count in each category
    pub fn new(root_folder: impl Into<PathBuf>) -> Self {
        Self::with_counts(root_folder, DEFAULT_POEM_COUNT, DEFAULT_POEM_COUNT)
    }

    /// Create a repository with explicit per-category poem counts
    pub fn with_counts(root_folder: impl Into<PathBuf>, human_count: u32, ai_count: u32) -> Self {
        Self {
            root_folder: root_folder.into(),
            human_count,
            ai_count,
        }
    }

    /// Number of poems available for a category
    pub fn count(&self, category: Category) -> u32 {
        match category {
            Category::Human => self.human_count,
            Category::Ai => self.ai_count,
        }
    }

    /// Filesystem location of a poem
    pub fn file_path(&self, category: Category, id: u32) -> PathBuf {
        self.root_folder
            .join(category.dir_name())
            .join(format!("{}.txt", id))
    }

    /// Pick a uniformly random poem in [1, count] from a category
    pub fn pick<R: Rng + ?Sized>(
        &self,
        category: Category,
        count: u32,
        rng: &mut R,
    ) -> Result<PoemRecord> {
        if count == 0 {
            return Err(Error::InvalidInput(format!(
                "No {} poems configured",
                category
            )));
        }

        let id = rng.gen_range(1..=count);
        let poem = self.load(category, id)?;
        info!("Selected poem {}", poem.path);
        Ok(poem)
    }

    /// Flip a fair coin between Human and AI, then pick from that category
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PoemRecord> {
        let category = if rng.gen_bool(0.5) {
            Category::Human
        } else {
            Category::Ai
        };
        self.pick(category, self.count(category), rng)
    }

    /// Load a specific poem
    ///
    /// A missing file is reported as `Error::NotFound`.
    pub fn load(&self, category: Category, id: u32) -> Result<PoemRecord> {
        let file_path = self.file_path(category, id);
        debug!("Reading poem file {}", file_path.display());

        let text = std::fs::read_to_string(&file_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("Poem file {}", file_path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        Ok(PoemRecord {
            id,
            category,
            path: log_path(category, id),
            text,
        })
    }
}
