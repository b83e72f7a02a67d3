//! Shared application state.

use std::sync::Arc;

use repertoire_realtime::webhook::IndexingWebhookReceiver;
use repertoire_search::engine::SearchEngine;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Index used to answer search requests.
    pub engine: Arc<dyn SearchEngine>,
    /// Handles task-finished callbacks from the index.
    pub webhook: Arc<IndexingWebhookReceiver>,
    /// Shared secret the index presents on webhook calls.
    pub webhook_secret: Arc<str>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        webhook: Arc<IndexingWebhookReceiver>,
        webhook_secret: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            engine,
            webhook,
            webhook_secret: webhook_secret.into(),
        }
    }
}
