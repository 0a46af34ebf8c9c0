//! Per-poem rating and guess-accuracy statistics

use crate::results::{LogSnapshot, ResultEntry};
use serde::Serialize;

/// Aggregate statistics for one poem
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PoemStats {
    /// No judgments recorded for this poem
    NoData,
    Summary {
        /// Mean quality rating
        mean_rating: f64,
        /// Percentage of guesses matching the true origin (0-100)
        accuracy_pct: f64,
        /// Number of judgments the figures are based on
        total: usize,
    },
}

impl PoemStats {
    /// Compute mean rating and guess accuracy over a poem's entries
    pub fn compute(entries: &[ResultEntry]) -> Self {
        if entries.is_empty() {
            return PoemStats::NoData;
        }

        let total = entries.len();
        let rating_sum: u32 = entries.iter().map(|e| u32::from(e.rating)).sum();
        let correct = entries.iter().filter(|e| e.is_correct()).count();

        PoemStats::Summary {
            mean_rating: f64::from(rating_sum) / total as f64,
            accuracy_pct: 100.0 * correct as f64 / total as f64,
            total,
        }
    }

    /// Statistics for a log read; a missing or empty log has no data
    pub fn from_snapshot(snapshot: &LogSnapshot) -> Self {
        Self::compute(snapshot.entries())
    }

    /// Feedback lines shown under a poem, empty when there is no data
    pub fn display_lines(&self) -> Vec<String> {
        match self {
            PoemStats::NoData => Vec::new(),
            PoemStats::Summary {
                mean_rating,
                accuracy_pct,
                ..
            } => vec![
                format!("Average Rating for this Poem: {:.2}/10", mean_rating),
                format!("Accuracy of Guesses: {:.2}%", accuracy_pct),
            ],
        }
    }
}
