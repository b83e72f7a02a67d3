//! Topic registry.
//!
//! The set of topics is closed. Each topic maps to exactly one transport
//! queue; the mapping is static by default and can be narrowed or renamed
//! for a deployment, in which case lookups for absent topics fail.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use repertoire_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Event names understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// An album was created.
    AlbumCreated,
    /// A single album was updated.
    AlbumUpdated,
    /// Several albums changed and their songs must be refreshed.
    AlbumsUpdated,
    /// A single album was deleted.
    AlbumDeleted,
    /// Several albums were deleted.
    AlbumsDeleted,
    /// An artist was created.
    ArtistCreated,
    /// A single artist was updated.
    ArtistUpdated,
    /// A single artist was deleted.
    ArtistDeleted,
    /// Several artists were deleted.
    ArtistsDeleted,
    /// A song was created.
    SongCreated,
    /// A single song was updated.
    SongUpdated,
    /// Several songs were updated.
    SongsUpdated,
    /// A single song was deleted.
    SongDeleted,
    /// Several songs were deleted.
    SongsDeleted,
    /// A user account was deleted.
    UserDeleted,
    /// Add documents to the search index.
    AddToSearchEngine,
    /// Update (merge) documents in the search index.
    UpdateFromSearchEngine,
    /// Delete documents from the search index.
    DeleteFromSearchEngine,
    /// Remove storage directories.
    DeleteDirectoriesStorage,
}

impl Topic {
    /// Every registered topic.
    pub const ALL: [Topic; 19] = [
        Topic::AlbumCreated,
        Topic::AlbumUpdated,
        Topic::AlbumsUpdated,
        Topic::AlbumDeleted,
        Topic::AlbumsDeleted,
        Topic::ArtistCreated,
        Topic::ArtistUpdated,
        Topic::ArtistDeleted,
        Topic::ArtistsDeleted,
        Topic::SongCreated,
        Topic::SongUpdated,
        Topic::SongsUpdated,
        Topic::SongDeleted,
        Topic::SongsDeleted,
        Topic::UserDeleted,
        Topic::AddToSearchEngine,
        Topic::UpdateFromSearchEngine,
        Topic::DeleteFromSearchEngine,
        Topic::DeleteDirectoriesStorage,
    ];

    /// The topic's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Topic::AlbumCreated => "AlbumCreated",
            Topic::AlbumUpdated => "AlbumUpdated",
            Topic::AlbumsUpdated => "AlbumsUpdated",
            Topic::AlbumDeleted => "AlbumDeleted",
            Topic::AlbumsDeleted => "AlbumsDeleted",
            Topic::ArtistCreated => "ArtistCreated",
            Topic::ArtistUpdated => "ArtistUpdated",
            Topic::ArtistDeleted => "ArtistDeleted",
            Topic::ArtistsDeleted => "ArtistsDeleted",
            Topic::SongCreated => "SongCreated",
            Topic::SongUpdated => "SongUpdated",
            Topic::SongsUpdated => "SongsUpdated",
            Topic::SongDeleted => "SongDeleted",
            Topic::SongsDeleted => "SongsDeleted",
            Topic::UserDeleted => "UserDeleted",
            Topic::AddToSearchEngine => "AddToSearchEngine",
            Topic::UpdateFromSearchEngine => "UpdateFromSearchEngine",
            Topic::DeleteFromSearchEngine => "DeleteFromSearchEngine",
            Topic::DeleteDirectoriesStorage => "DeleteDirectoriesStorage",
        }
    }

    /// The queue this topic is routed to unless a registry overrides it.
    #[must_use]
    pub const fn default_queue(self) -> &'static str {
        match self {
            Topic::AlbumCreated => "album-created-queue",
            Topic::AlbumUpdated => "album-updated-queue",
            Topic::AlbumsUpdated => "albums-updated-queue",
            Topic::AlbumDeleted => "album-deleted-queue",
            Topic::AlbumsDeleted => "albums-deleted-queue",
            Topic::ArtistCreated => "artist-created-queue",
            Topic::ArtistUpdated => "artist-updated-queue",
            Topic::ArtistDeleted => "artist-deleted-queue",
            Topic::ArtistsDeleted => "artists-deleted-queue",
            Topic::SongCreated => "song-created-queue",
            Topic::SongUpdated => "song-updated-queue",
            Topic::SongsUpdated => "songs-updated-queue",
            Topic::SongDeleted => "song-deleted-queue",
            Topic::SongsDeleted => "songs-deleted-queue",
            Topic::UserDeleted => "user-deleted-queue",
            Topic::AddToSearchEngine => "add-to-search-engine-queue",
            Topic::UpdateFromSearchEngine => "update-from-search-engine-queue",
            Topic::DeleteFromSearchEngine => "delete-from-search-engine-queue",
            Topic::DeleteDirectoriesStorage => "delete-directories-storage-queue",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| DomainError::UnknownTopic(s.to_owned()))
    }
}

/// Maps topics to transport queues.
#[derive(Debug, Clone)]
pub struct TopicRegistry {
    queues: HashMap<Topic, String>,
}

impl TopicRegistry {
    /// Builds a registry from explicit `(topic, queue)` pairs. Topics not
    /// listed are unregistered.
    pub fn with_queues<I, Q>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Topic, Q)>,
        Q: Into<String>,
    {
        Self {
            queues: entries
                .into_iter()
                .map(|(topic, queue)| (topic, queue.into()))
                .collect(),
        }
    }

    /// Resolves the destination queue for `topic`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownTopic` if the topic is not registered.
    pub fn queue_for(&self, topic: Topic) -> Result<&str, DomainError> {
        self.queues
            .get(&topic)
            .map(String::as_str)
            .ok_or_else(|| DomainError::UnknownTopic(topic.to_string()))
    }

    /// Every distinct queue in the registry.
    pub fn queues(&self) -> impl Iterator<Item = &str> {
        let mut queues: Vec<&str> = self.queues.values().map(String::as_str).collect();
        queues.sort_unstable();
        queues.dedup();
        queues.into_iter()
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::with_queues(
            Topic::ALL
                .into_iter()
                .map(|topic| (topic, topic.default_queue())),
        )
    }
}
