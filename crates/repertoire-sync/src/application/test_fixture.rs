//! Shared fixture for lifecycle handler tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use repertoire_bus::{Message, MessageHandler, Topic};
use repertoire_core::error::DomainError;
use repertoire_core::model::{Album, Artist, Song};
use repertoire_core::storage::DirectoryLayout;
use repertoire_search::domain::commands::{
    AddToSearchEngine, DeleteFromSearchEngine, UpdateFromSearchEngine,
};
use repertoire_test_support::{FakeSearchEngine, InMemoryCatalog, RecordingBus};
use serde::Serialize;
use uuid::Uuid;

use super::context::SyncContext;
use super::registry::{LifecycleEvent, LifecycleHandler};
use super::storage_cleanup::StorageCleanupPublisher;
use crate::domain::commands::DeleteDirectoriesStorage;

pub(crate) struct Fixture {
    pub ctx: SyncContext,
    pub catalog: Arc<InMemoryCatalog>,
    pub engine: Arc<FakeSearchEngine>,
    pub bus: Arc<RecordingBus>,
    pub user_id: Uuid,
    pub at: DateTime<Utc>,
}

impl Fixture {
    pub fn new() -> Self {
        let (publisher, bus) = RecordingBus::publisher();
        let catalog = Arc::new(InMemoryCatalog::new());
        let engine = Arc::new(FakeSearchEngine::new());
        let ctx = SyncContext {
            publisher: publisher.clone(),
            artists: catalog.clone(),
            albums: catalog.clone(),
            songs: catalog.clone(),
            engine: engine.clone(),
            storage: StorageCleanupPublisher::new(publisher, Arc::new(DirectoryLayout::default())),
        };
        Self {
            ctx,
            catalog,
            engine,
            bus,
            user_id: Uuid::new_v4(),
            at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    /// A stored artist.
    pub fn artist(&self, name: &str) -> Artist {
        let artist = Artist::new(Uuid::new_v4(), self.user_id, name, self.at);
        self.catalog.insert_artist(&artist);
        artist
    }

    /// A stored album, optionally by `artist`.
    pub fn album(&self, title: &str, artist: Option<&Artist>) -> Album {
        let mut album = Album::new(Uuid::new_v4(), self.user_id, title, self.at);
        album.artist_id = artist.map(|a| a.id);
        self.catalog.insert_album(&album);
        album
    }

    /// A stored song, optionally by `artist` and on `album`.
    pub fn song(&self, title: &str, artist: Option<&Artist>, album: Option<&Album>) -> Song {
        let mut song = Song::new(Uuid::new_v4(), self.user_id, title, self.at);
        song.artist_id = artist.map(|a| a.id);
        song.album_id = album.map(|a| a.id);
        self.catalog.insert_song(&song);
        song
    }

    /// Runs `event` through its bus handler.
    pub async fn dispatch<E: LifecycleEvent + Serialize>(&self, event: &E) -> Result<(), DomainError> {
        let message = Message::encode(E::TOPIC, event)?;
        LifecycleHandler::<E>::new(self.ctx.clone())
            .handle(&message)
            .await
    }

    pub fn adds(&self) -> Vec<AddToSearchEngine> {
        self.bus.payloads(Topic::AddToSearchEngine)
    }

    pub fn updates(&self) -> Vec<UpdateFromSearchEngine> {
        self.bus.payloads(Topic::UpdateFromSearchEngine)
    }

    pub fn deletes(&self) -> Vec<DeleteFromSearchEngine> {
        self.bus.payloads(Topic::DeleteFromSearchEngine)
    }

    pub fn cleanups(&self) -> Vec<DeleteDirectoriesStorage> {
        self.bus.payloads(Topic::DeleteDirectoriesStorage)
    }
}
