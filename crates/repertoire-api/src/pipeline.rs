//! Wires the lifecycle and dispatch handlers onto the in-memory bus.

use std::sync::Arc;
use std::time::Duration;

use repertoire_bus::{BusConfig, BusHandle, InMemoryBus, MessageHandler, Publisher, TopicRegistry};
use repertoire_core::error::DomainError;
use repertoire_core::repository::{AlbumRepository, ArtistRepository, SongRepository};
use repertoire_core::storage::StoragePathProvider;
use repertoire_realtime::broker::RealtimeBroker;
use repertoire_realtime::notifier::RealtimeNotifier;
use repertoire_realtime::token::TokenIssuer;
use repertoire_realtime::webhook::IndexingWebhookReceiver;
use repertoire_search::application::dispatch_handlers::SearchDispatch;
use repertoire_search::engine::SearchEngine;
use repertoire_search::task_tracker::TaskTracker;
use repertoire_sync::application::context::SyncContext;
use repertoire_sync::application::registry::lifecycle_handlers;
use repertoire_sync::application::storage_cleanup::StorageCleanupPublisher;
use tracing::info;

/// External systems the pipeline talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub artists: Arc<dyn ArtistRepository>,
    pub albums: Arc<dyn AlbumRepository>,
    pub songs: Arc<dyn SongRepository>,
    pub engine: Arc<dyn SearchEngine>,
    pub broker: Arc<dyn RealtimeBroker>,
    pub issuer: Arc<dyn TokenIssuer>,
    pub paths: Arc<dyn StoragePathProvider>,
}

/// Tunables for a running pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub bus: BusConfig,
    /// How long a task id stays correlated with its user.
    pub task_ttl: Duration,
    /// How long an issued broker token is reused.
    pub token_cache_ttl: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            task_ttl: Duration::from_secs(300),
            token_cache_ttl: Duration::from_secs(3540),
        }
    }
}

/// A started pipeline.
pub struct Pipeline {
    /// Publishes lifecycle events into the bus.
    pub publisher: Publisher,
    pub tracker: Arc<TaskTracker>,
    pub webhook: Arc<IndexingWebhookReceiver>,
    bus: BusHandle,
}

impl Pipeline {
    /// Builds every handler and starts the bus.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the bus start error (a handler routed to an unknown queue).
    pub fn start(deps: Collaborators, settings: PipelineSettings) -> Result<Self, DomainError> {
        let registry = Arc::new(TopicRegistry::default());
        let bus = Arc::new(InMemoryBus::new(registry.clone()));
        let publisher = Publisher::new(bus.clone(), registry);

        let tracker = Arc::new(TaskTracker::new(settings.task_ttl));
        let notifier = Arc::new(RealtimeNotifier::new(
            deps.broker,
            deps.issuer,
            settings.token_cache_ttl,
        ));
        let webhook = Arc::new(IndexingWebhookReceiver::new(
            deps.engine.clone(),
            tracker.clone(),
            notifier,
        ));

        let ctx = SyncContext {
            publisher: publisher.clone(),
            artists: deps.artists,
            albums: deps.albums,
            songs: deps.songs,
            engine: deps.engine.clone(),
            storage: StorageCleanupPublisher::new(publisher.clone(), deps.paths),
        };
        let mut handlers: Vec<Arc<dyn MessageHandler>> = lifecycle_handlers(&ctx);
        handlers.extend(SearchDispatch::new(deps.engine, tracker.clone()).handlers());
        info!(handlers = handlers.len(), "starting message bus");
        let bus = bus.start(handlers, settings.bus)?;

        Ok(Self {
            publisher,
            tracker,
            webhook,
            bus,
        })
    }

    /// Stops the bus dispatch loops.
    pub async fn shutdown(self) {
        self.bus.shutdown().await;
    }
}
