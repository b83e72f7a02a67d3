//! Storage directory layout.
//!
//! File transfer itself belongs to the storage service; the pipeline only
//! needs to know which directory an entity's files live under so it can
//! ask for that directory to be removed.

use uuid::Uuid;

use crate::model::{Album, Artist, Song};

/// Computes per-entity storage directory paths.
pub trait StoragePathProvider: Send + Sync {
    /// Directory holding every file owned by the user.
    fn user_directory(&self, user_id: Uuid) -> String;

    /// Directory holding the artist's files.
    fn artist_directory(&self, artist: &Artist) -> String;

    /// Directory holding the album's files.
    fn album_directory(&self, album: &Album) -> String;

    /// Directory holding the song's files.
    fn song_directory(&self, song: &Song) -> String;
}

/// Default `<root>/<user>/<collection>/<id>` layout.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLayout {
    root: String,
}

impl DirectoryLayout {
    /// Creates a layout rooted at `root`. An empty root yields relative paths.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        let root: String = root.into();
        Self {
            root: root.trim_end_matches('/').to_owned(),
        }
    }

    fn entity_directory(&self, user_id: Uuid, collection: &str, id: Uuid) -> String {
        format!("{}/{collection}/{id}", self.user_directory(user_id))
    }
}

impl StoragePathProvider for DirectoryLayout {
    fn user_directory(&self, user_id: Uuid) -> String {
        if self.root.is_empty() {
            user_id.to_string()
        } else {
            format!("{}/{user_id}", self.root)
        }
    }

    fn artist_directory(&self, artist: &Artist) -> String {
        self.entity_directory(artist.user_id, "artists", artist.id)
    }

    fn album_directory(&self, album: &Album) -> String {
        self.entity_directory(album.user_id, "albums", album.id)
    }

    fn song_directory(&self, song: &Song) -> String {
        self.entity_directory(song.user_id, "songs", song.id)
    }
}
