//! Storage cleanup publisher.
//!
//! Deleted entities leave directories behind in file storage. The storage
//! service owns those files; this side only computes which directories
//! belong to the deleted entities and asks for their removal.

use std::sync::Arc;

use repertoire_bus::{Publisher, Topic};
use repertoire_core::error::DomainError;
use repertoire_core::model::{Album, Artist, Song};
use repertoire_core::storage::StoragePathProvider;
use tracing::debug;
use uuid::Uuid;

use crate::domain::commands::DeleteDirectoriesStorage;

#[derive(Clone)]
pub struct StorageCleanupPublisher {
    publisher: Publisher,
    paths: Arc<dyn StoragePathProvider>,
}

impl StorageCleanupPublisher {
    #[must_use]
    pub fn new(publisher: Publisher, paths: Arc<dyn StoragePathProvider>) -> Self {
        Self { publisher, paths }
    }

    #[must_use]
    pub fn user_directory(&self, user_id: Uuid) -> String {
        self.paths.user_directory(user_id)
    }

    #[must_use]
    pub fn artist_directory(&self, artist: &Artist) -> String {
        self.paths.artist_directory(artist)
    }

    #[must_use]
    pub fn album_directory(&self, album: &Album) -> String {
        self.paths.album_directory(album)
    }

    #[must_use]
    pub fn song_directory(&self, song: &Song) -> String {
        self.paths.song_directory(song)
    }

    /// Publishes one `DeleteDirectoriesStorage` command for `paths`.
    /// Nothing is published for an empty list.
    ///
    /// # Errors
    ///
    /// Returns the publisher's error.
    pub async fn delete_directories(&self, paths: Vec<String>) -> Result<(), DomainError> {
        if paths.is_empty() {
            return Ok(());
        }
        debug!(count = paths.len(), "publishing storage cleanup");
        self.publisher
            .publish(
                Topic::DeleteDirectoriesStorage,
                &DeleteDirectoriesStorage { paths },
            )
            .await?;
        Ok(())
    }
}
