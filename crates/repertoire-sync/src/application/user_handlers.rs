//! User lifecycle handlers.

use async_trait::async_trait;
use repertoire_bus::Topic;
use repertoire_core::error::DomainError;
use repertoire_search::domain::documents::SearchDocument;
use repertoire_search::domain::filter::DocumentFilter;
use tracing::{info, instrument};

use super::context::SyncContext;
use super::registry::LifecycleEvent;
use crate::domain::events::UserDeleted;

/// Removes every document the user owned and their whole storage tree.
#[async_trait]
impl LifecycleEvent for UserDeleted {
    const TOPIC: Topic = Topic::UserDeleted;
    const HANDLER: &'static str = "user.deleted";

    #[instrument(skip_all, fields(user_id = %self.user_id))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        let owned = ctx
            .engine
            .get_documents(&DocumentFilter::OwnedBy(self.user_id))
            .await?;
        let ids: Vec<_> = owned.iter().map(SearchDocument::id).collect();
        let deleted = ids.len();
        if !ids.is_empty() {
            ctx.delete_documents(self.user_id, ids).await?;
        }

        ctx.storage
            .delete_directories(vec![ctx.storage.user_directory(self.user_id)])
            .await?;
        info!(deleted, "user removal published");
        Ok(())
    }
}
