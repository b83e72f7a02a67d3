//! Search command dispatch handlers.
//!
//! Each handler decodes a search command, executes it against the engine
//! and records the returned task uid against the user that caused it. The
//! engine call returns as soon as the task is enqueued.

use std::sync::Arc;

use async_trait::async_trait;
use repertoire_bus::{Message, MessageHandler, Topic};
use repertoire_core::error::DomainError;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::commands::{AddToSearchEngine, DeleteFromSearchEngine, UpdateFromSearchEngine};
use crate::engine::{SearchEngine, TaskUid};
use crate::task_tracker::TaskTracker;

/// Shared collaborators of the dispatch handlers.
#[derive(Clone)]
pub struct SearchDispatch {
    engine: Arc<dyn SearchEngine>,
    tracker: Arc<TaskTracker>,
}

impl SearchDispatch {
    /// Creates the dispatch context.
    #[must_use]
    pub fn new(engine: Arc<dyn SearchEngine>, tracker: Arc<TaskTracker>) -> Self {
        Self { engine, tracker }
    }

    /// The three dispatch handlers, ready to register on a bus.
    #[must_use]
    pub fn handlers(&self) -> Vec<Arc<dyn MessageHandler>> {
        vec![
            Arc::new(AddToSearchEngineHandler(self.clone())),
            Arc::new(UpdateFromSearchEngineHandler(self.clone())),
            Arc::new(DeleteFromSearchEngineHandler(self.clone())),
        ]
    }

    fn track(&self, task_uid: TaskUid, user_id: Uuid, operation: &'static str, count: usize) {
        self.tracker.track(task_uid, user_id);
        info!(%task_uid, %user_id, operation, count, "search task enqueued");
    }
}

/// Handles `AddToSearchEngine`.
pub struct AddToSearchEngineHandler(SearchDispatch);

#[async_trait]
impl MessageHandler for AddToSearchEngineHandler {
    fn name(&self) -> &'static str {
        "search.add_documents"
    }

    fn topic(&self) -> Topic {
        Topic::AddToSearchEngine
    }

    #[instrument(skip_all, fields(handler = self.name(), message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<(), DomainError> {
        let command: AddToSearchEngine = message.decode()?;
        if command.documents.is_empty() {
            debug!("empty add batch");
            return Ok(());
        }
        let task_uid = self.0.engine.add(&command.documents).await?;
        self.0
            .track(task_uid, command.user_id, "add", command.documents.len());
        Ok(())
    }
}

/// Handles `UpdateFromSearchEngine`.
pub struct UpdateFromSearchEngineHandler(SearchDispatch);

#[async_trait]
impl MessageHandler for UpdateFromSearchEngineHandler {
    fn name(&self) -> &'static str {
        "search.update_documents"
    }

    fn topic(&self) -> Topic {
        Topic::UpdateFromSearchEngine
    }

    #[instrument(skip_all, fields(handler = self.name(), message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<(), DomainError> {
        let command: UpdateFromSearchEngine = message.decode()?;
        if command.documents.is_empty() {
            debug!("empty update batch");
            return Ok(());
        }
        let task_uid = self.0.engine.update(&command.documents).await?;
        self.0
            .track(task_uid, command.user_id, "update", command.documents.len());
        Ok(())
    }
}

/// Handles `DeleteFromSearchEngine`.
pub struct DeleteFromSearchEngineHandler(SearchDispatch);

#[async_trait]
impl MessageHandler for DeleteFromSearchEngineHandler {
    fn name(&self) -> &'static str {
        "search.delete_documents"
    }

    fn topic(&self) -> Topic {
        Topic::DeleteFromSearchEngine
    }

    #[instrument(skip_all, fields(handler = self.name(), message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<(), DomainError> {
        let command: DeleteFromSearchEngine = message.decode()?;
        if command.ids.is_empty() {
            debug!("empty delete batch");
            return Ok(());
        }
        let task_uid = self.0.engine.delete(&command.ids).await?;
        self.0
            .track(task_uid, command.user_id, "delete", command.ids.len());
        Ok(())
    }
}
