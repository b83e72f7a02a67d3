//! Indexing task completion callbacks.

use std::sync::Arc;

use repertoire_core::error::DomainError;
use repertoire_search::engine::{SearchEngine, TaskUid};
use repertoire_search::task_tracker::TaskTracker;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::notifier::RealtimeNotifier;

/// Body of the engine's task-finished callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCallback {
    /// Task uid returned when the mutation was enqueued.
    pub uid: i64,
    /// Terminal task status.
    pub status: String,
}

/// What a successfully processed callback led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The owning user was notified.
    Notified(Uuid),
    /// Nobody tracked the task; nothing to do.
    Untracked,
}

/// Turns task-finished callbacks into user notifications.
pub struct IndexingWebhookReceiver {
    engine: Arc<dyn SearchEngine>,
    tracker: Arc<TaskTracker>,
    notifier: Arc<RealtimeNotifier>,
}

impl IndexingWebhookReceiver {
    #[must_use]
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        tracker: Arc<TaskTracker>,
        notifier: Arc<RealtimeNotifier>,
    ) -> Self {
        Self {
            engine,
            tracker,
            notifier,
        }
    }

    /// Parses and processes a raw (already decompressed) callback body.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Serialization` for a malformed body, otherwise
    /// whatever [`Self::receive`] returns.
    pub async fn receive_body(&self, body: &[u8]) -> Result<WebhookOutcome, DomainError> {
        let callback: TaskCallback = serde_json::from_slice(body)?;
        self.receive(&callback).await
    }

    /// Processes one callback.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TaskFailed` when the task did not succeed; the
    /// remote task will not run again, so this is reported and not retried.
    /// Returns the notifier's error if the invalidation publish fails.
    #[instrument(skip(self, callback), fields(task_uid = callback.uid, status = %callback.status))]
    pub async fn receive(&self, callback: &TaskCallback) -> Result<WebhookOutcome, DomainError> {
        if !self.engine.has_task_succeeded(&callback.status) {
            warn!("indexing task did not succeed");
            return Err(DomainError::TaskFailed {
                task_uid: callback.uid,
                status: callback.status.clone(),
            });
        }

        let Some(user_id) = self.tracker.user_for(TaskUid(callback.uid)) else {
            debug!("no user tracked for task");
            return Ok(WebhookOutcome::Untracked);
        };

        self.notifier.notify_search_invalidated(user_id).await?;
        Ok(WebhookOutcome::Notified(user_id))
    }
}
