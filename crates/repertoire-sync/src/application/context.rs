//! Collaborators shared by every lifecycle handler.

use std::sync::Arc;

use repertoire_bus::{Publisher, Topic};
use repertoire_core::error::DomainError;
use repertoire_core::model::{Album, Artist};
use repertoire_core::repository::{AlbumRepository, ArtistRepository, SongRepository};
use repertoire_search::domain::commands::{
    AddToSearchEngine, DeleteFromSearchEngine, UpdateFromSearchEngine,
};
use repertoire_search::domain::documents::{DocumentId, DocumentUpdate, SearchDocument};
use repertoire_search::engine::SearchEngine;
use tracing::debug;
use uuid::Uuid;

use super::storage_cleanup::StorageCleanupPublisher;

/// Injected, concurrency-safe collaborators. Cloning is cheap and handlers
/// keep no other state.
#[derive(Clone)]
pub struct SyncContext {
    pub publisher: Publisher,
    pub artists: Arc<dyn ArtistRepository>,
    pub albums: Arc<dyn AlbumRepository>,
    pub songs: Arc<dyn SongRepository>,
    /// Used only for reads; index mutations go through the bus.
    pub engine: Arc<dyn SearchEngine>,
    pub storage: StorageCleanupPublisher,
}

impl SyncContext {
    /// The parent artist: the embedded object when present, otherwise the
    /// one `artist_id` points at.
    ///
    /// # Errors
    ///
    /// Returns the repository's error, including `NotFound` for a dangling
    /// foreign key.
    pub async fn resolve_artist(
        &self,
        embedded: Option<&Artist>,
        artist_id: Option<Uuid>,
    ) -> Result<Option<Artist>, DomainError> {
        match (embedded, artist_id) {
            (Some(artist), _) => Ok(Some(artist.clone())),
            (None, Some(id)) => self.artists.get(id).await.map(Some),
            (None, None) => Ok(None),
        }
    }

    /// The parent album, loaded with its artist when it has to be fetched.
    ///
    /// # Errors
    ///
    /// Returns the repository's error, including `NotFound` for a dangling
    /// foreign key.
    pub async fn resolve_album(
        &self,
        embedded: Option<&Album>,
        album_id: Option<Uuid>,
    ) -> Result<Option<Album>, DomainError> {
        match (embedded, album_id) {
            (Some(album), _) => Ok(Some(album.clone())),
            (None, Some(id)) => self.albums.get_with_artist(id).await.map(Some),
            (None, None) => Ok(None),
        }
    }

    /// Publishes one `AddToSearchEngine` command.
    ///
    /// # Errors
    ///
    /// Returns the publisher's error.
    pub async fn add_documents(
        &self,
        user_id: Uuid,
        documents: Vec<SearchDocument>,
    ) -> Result<(), DomainError> {
        debug!(%user_id, count = documents.len(), "publishing add command");
        self.publisher
            .publish(
                Topic::AddToSearchEngine,
                &AddToSearchEngine { user_id, documents },
            )
            .await?;
        Ok(())
    }

    /// Publishes one `UpdateFromSearchEngine` command.
    ///
    /// # Errors
    ///
    /// Returns the publisher's error.
    pub async fn update_documents(
        &self,
        user_id: Uuid,
        documents: Vec<DocumentUpdate>,
    ) -> Result<(), DomainError> {
        debug!(%user_id, count = documents.len(), "publishing update command");
        self.publisher
            .publish(
                Topic::UpdateFromSearchEngine,
                &UpdateFromSearchEngine { user_id, documents },
            )
            .await?;
        Ok(())
    }

    /// Publishes one `DeleteFromSearchEngine` command.
    ///
    /// # Errors
    ///
    /// Returns the publisher's error.
    pub async fn delete_documents(
        &self,
        user_id: Uuid,
        ids: Vec<DocumentId>,
    ) -> Result<(), DomainError> {
        debug!(%user_id, count = ids.len(), "publishing delete command");
        self.publisher
            .publish(
                Topic::DeleteFromSearchEngine,
                &DeleteFromSearchEngine { user_id, ids },
            )
            .await?;
        Ok(())
    }
}
