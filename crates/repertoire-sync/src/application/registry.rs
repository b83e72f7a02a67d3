//! Binding of lifecycle events to bus handlers.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use repertoire_bus::{Message, MessageHandler, Topic};
use repertoire_core::error::DomainError;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::context::SyncContext;
use crate::domain::events::{
    AlbumCreated, AlbumDeleted, AlbumUpdated, AlbumsDeleted, AlbumsUpdated, ArtistCreated,
    ArtistDeleted, ArtistUpdated, ArtistsDeleted, SongCreated, SongDeleted, SongUpdated,
    SongsDeleted, SongsUpdated, UserDeleted,
};

/// A lifecycle payload together with the reaction to it.
#[async_trait]
pub trait LifecycleEvent: DeserializeOwned + Send + Sync + 'static {
    /// Topic the payload is published under.
    const TOPIC: Topic;
    /// Name of the handler reacting to it.
    const HANDLER: &'static str;

    /// Reacts to the event.
    ///
    /// # Errors
    ///
    /// Returns the first collaborator error; the bus redelivers and every
    /// step runs again.
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError>;
}

/// Bus handler that decodes `E` and applies it.
pub struct LifecycleHandler<E> {
    ctx: SyncContext,
    event: PhantomData<fn() -> E>,
}

impl<E: LifecycleEvent> LifecycleHandler<E> {
    #[must_use]
    pub fn new(ctx: SyncContext) -> Self {
        Self {
            ctx,
            event: PhantomData,
        }
    }
}

#[async_trait]
impl<E: LifecycleEvent> MessageHandler for LifecycleHandler<E> {
    fn name(&self) -> &'static str {
        E::HANDLER
    }

    fn topic(&self) -> Topic {
        E::TOPIC
    }

    #[instrument(skip_all, fields(handler = E::HANDLER, message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<(), DomainError> {
        let event: E = message.decode()?;
        event.apply(&self.ctx).await
    }
}

fn handler<E: LifecycleEvent>(ctx: &SyncContext) -> Arc<dyn MessageHandler> {
    Arc::new(LifecycleHandler::<E>::new(ctx.clone()))
}

/// Every lifecycle handler, one per lifecycle topic.
#[must_use]
pub fn lifecycle_handlers(ctx: &SyncContext) -> Vec<Arc<dyn MessageHandler>> {
    vec![
        handler::<ArtistCreated>(ctx),
        handler::<ArtistUpdated>(ctx),
        handler::<ArtistDeleted>(ctx),
        handler::<ArtistsDeleted>(ctx),
        handler::<AlbumCreated>(ctx),
        handler::<AlbumUpdated>(ctx),
        handler::<AlbumsUpdated>(ctx),
        handler::<AlbumDeleted>(ctx),
        handler::<AlbumsDeleted>(ctx),
        handler::<SongCreated>(ctx),
        handler::<SongUpdated>(ctx),
        handler::<SongsUpdated>(ctx),
        handler::<SongDeleted>(ctx),
        handler::<SongsDeleted>(ctx),
        handler::<UserDeleted>(ctx),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::application::test_fixture::Fixture;

    #[test]
    fn test_one_handler_per_lifecycle_topic() {
        let f = Fixture::new();

        let handlers = lifecycle_handlers(&f.ctx);

        let topics: HashSet<Topic> = handlers.iter().map(|h| h.topic()).collect();
        let names: HashSet<&str> = handlers.iter().map(|h| h.name()).collect();
        assert_eq!(handlers.len(), 15);
        assert_eq!(topics.len(), 15);
        assert_eq!(names.len(), 15);
        assert!(!topics.contains(&Topic::AddToSearchEngine));
        assert!(!topics.contains(&Topic::DeleteDirectoriesStorage));
    }
}
