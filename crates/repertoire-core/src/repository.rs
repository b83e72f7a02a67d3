//! Read-side catalog repository abstractions.
//!
//! The pipeline never trusts an event payload for anything beyond the entity
//! that triggered it; these are the calls it uses to rehydrate authoritative
//! state when building denormalized search documents.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::model::{Album, Artist, Song};

/// Reads artists from the primary store.
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Loads a single artist without associations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no artist has this id.
    async fn get(&self, id: Uuid) -> Result<Artist, DomainError>;

    /// Loads an artist with its albums and songs.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no artist has this id.
    async fn get_with_associations(&self, id: Uuid) -> Result<Artist, DomainError>;
}

/// Reads albums from the primary store.
#[async_trait]
pub trait AlbumRepository: Send + Sync {
    /// Loads an album with its artist populated (when it has one).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no album has this id.
    async fn get_with_artist(&self, id: Uuid) -> Result<Album, DomainError>;

    /// Loads an album with its artist and songs.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no album has this id.
    async fn get_with_associations(&self, id: Uuid) -> Result<Album, DomainError>;

    /// Loads every album in `ids` with its artist and songs. Ids with no
    /// matching album are skipped.
    async fn get_all_by_ids_with_songs(&self, ids: &[Uuid]) -> Result<Vec<Album>, DomainError>;
}

/// Reads songs from the primary store.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Loads a song with its artist and album.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no song has this id.
    async fn get_with_associations(&self, id: Uuid) -> Result<Song, DomainError>;

    /// Loads every song in `ids` with its artist and album. Ids with no
    /// matching song are skipped.
    async fn get_all_by_ids_with_associations(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Song>, DomainError>;
}
