//! # Poem Turing Test Common Library
//!
//! Shared code for the poem Turing test service:
//! - Poem categories and the on-disk poem repository
//! - The append-only results log
//! - Per-poem rating/accuracy statistics
//! - Author lookup for human-written poems
//! - Configuration loading

pub mod authors;
pub mod config;
pub mod error;
pub mod poem;
pub mod results;
pub mod stats;

pub use error::{Error, Result};
pub use poem::{Category, PoemRecord, PoemRepository};
pub use results::{LogSnapshot, ResultEntry, ResultStore};
pub use stats::PoemStats;
