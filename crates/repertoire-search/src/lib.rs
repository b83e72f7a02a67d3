//! Repertoire: search index synchronization.
//!
//! Holds the denormalized search projections, the search commands that
//! carry them over the bus, the [`engine::SearchEngine`] abstraction with
//! its Meilisearch implementation, and the task tracker that correlates
//! asynchronous indexing tasks back to the user who triggered them.

pub mod application;
pub mod domain;
pub mod engine;
pub mod meilisearch;
pub mod task_tracker;
