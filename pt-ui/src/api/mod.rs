//! HTTP handlers for pt-ui
//!
//! - `page`: the poem page and its form posts
//! - `stats`: JSON statistics and author lookup
//! - `health`: health check

pub mod health;
pub mod page;
pub mod stats;

pub use health::health_routes;
pub use page::page_routes;
pub use stats::stats_routes;
