//! Test catalogs: in-memory implementations of the catalog repositories.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use repertoire_core::error::DomainError;
use repertoire_core::model::{Album, Artist, Song};
use repertoire_core::repository::{AlbumRepository, ArtistRepository, SongRepository};
use uuid::Uuid;

/// A catalog held in memory. Entities are stored bare and associations are
/// assembled on read from foreign keys, the way the primary store joins them.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    artists: Mutex<HashMap<Uuid, Artist>>,
    albums: Mutex<HashMap<Uuid, Album>>,
    songs: Mutex<HashMap<Uuid, Song>>,
}

fn bare_artist(artist: &Artist) -> Artist {
    Artist {
        albums: Vec::new(),
        songs: Vec::new(),
        ..artist.clone()
    }
}

fn bare_album(album: &Album) -> Album {
    Album {
        artist: None,
        songs: Vec::new(),
        ..album.clone()
    }
}

fn bare_song(song: &Song) -> Song {
    Song {
        artist: None,
        album: None,
        ..song.clone()
    }
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `artist`, dropping any loaded associations.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert_artist(&self, artist: &Artist) {
        self.artists
            .lock()
            .unwrap()
            .insert(artist.id, bare_artist(artist));
    }

    /// Stores `album`, dropping any loaded associations.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert_album(&self, album: &Album) {
        self.albums
            .lock()
            .unwrap()
            .insert(album.id, bare_album(album));
    }

    /// Stores `song`, dropping any loaded associations.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert_song(&self, song: &Song) {
        self.songs.lock().unwrap().insert(song.id, bare_song(song));
    }

    fn artist(&self, id: Uuid) -> Option<Artist> {
        self.artists.lock().unwrap().get(&id).cloned()
    }

    fn album(&self, id: Uuid) -> Option<Album> {
        self.albums.lock().unwrap().get(&id).cloned()
    }

    fn album_with_artist(&self, id: Uuid) -> Option<Album> {
        let mut album = self.album(id)?;
        album.artist = album
            .artist_id
            .and_then(|artist_id| self.artist(artist_id))
            .map(Box::new);
        Some(album)
    }

    fn album_with_associations(&self, id: Uuid) -> Option<Album> {
        let mut album = self.album_with_artist(id)?;
        album.songs = self.songs_where(|song| song.album_id == Some(id));
        Some(album)
    }

    fn song_with_associations(&self, id: Uuid) -> Option<Song> {
        let mut song = self.songs.lock().unwrap().get(&id).cloned()?;
        song.artist = song
            .artist_id
            .and_then(|artist_id| self.artist(artist_id))
            .map(Box::new);
        song.album = song
            .album_id
            .and_then(|album_id| self.album(album_id))
            .map(Box::new);
        Some(song)
    }

    fn songs_where(&self, predicate: impl Fn(&Song) -> bool) -> Vec<Song> {
        let mut songs: Vec<Song> = self
            .songs
            .lock()
            .unwrap()
            .values()
            .filter(|song| predicate(song))
            .cloned()
            .collect();
        songs.sort_by_key(|song| song.id);
        songs
    }
}

#[async_trait]
impl ArtistRepository for InMemoryCatalog {
    async fn get(&self, id: Uuid) -> Result<Artist, DomainError> {
        self.artist(id)
            .ok_or_else(|| DomainError::not_found("artist", id))
    }

    async fn get_with_associations(&self, id: Uuid) -> Result<Artist, DomainError> {
        let mut artist = self
            .artist(id)
            .ok_or_else(|| DomainError::not_found("artist", id))?;
        let mut albums: Vec<Album> = self
            .albums
            .lock()
            .unwrap()
            .values()
            .filter(|album| album.artist_id == Some(id))
            .cloned()
            .collect();
        albums.sort_by_key(|album| album.id);
        artist.albums = albums;
        artist.songs = self.songs_where(|song| song.artist_id == Some(id));
        Ok(artist)
    }
}

#[async_trait]
impl AlbumRepository for InMemoryCatalog {
    async fn get_with_artist(&self, id: Uuid) -> Result<Album, DomainError> {
        self.album_with_artist(id)
            .ok_or_else(|| DomainError::not_found("album", id))
    }

    async fn get_with_associations(&self, id: Uuid) -> Result<Album, DomainError> {
        self.album_with_associations(id)
            .ok_or_else(|| DomainError::not_found("album", id))
    }

    async fn get_all_by_ids_with_songs(&self, ids: &[Uuid]) -> Result<Vec<Album>, DomainError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.album_with_associations(*id))
            .collect())
    }
}

#[async_trait]
impl SongRepository for InMemoryCatalog {
    async fn get_with_associations(&self, id: Uuid) -> Result<Song, DomainError> {
        self.song_with_associations(id)
            .ok_or_else(|| DomainError::not_found("song", id))
    }

    async fn get_all_by_ids_with_associations(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Song>, DomainError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.song_with_associations(*id))
            .collect())
    }
}

/// A catalog whose every read fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingCatalog;

fn unavailable<T>() -> Result<T, DomainError> {
    Err(DomainError::Infrastructure("catalog unavailable".into()))
}

#[async_trait]
impl ArtistRepository for FailingCatalog {
    async fn get(&self, _id: Uuid) -> Result<Artist, DomainError> {
        unavailable()
    }

    async fn get_with_associations(&self, _id: Uuid) -> Result<Artist, DomainError> {
        unavailable()
    }
}

#[async_trait]
impl AlbumRepository for FailingCatalog {
    async fn get_with_artist(&self, _id: Uuid) -> Result<Album, DomainError> {
        unavailable()
    }

    async fn get_with_associations(&self, _id: Uuid) -> Result<Album, DomainError> {
        unavailable()
    }

    async fn get_all_by_ids_with_songs(&self, _ids: &[Uuid]) -> Result<Vec<Album>, DomainError> {
        unavailable()
    }
}

#[async_trait]
impl SongRepository for FailingCatalog {
    async fn get_with_associations(&self, _id: Uuid) -> Result<Song, DomainError> {
        unavailable()
    }

    async fn get_all_by_ids_with_associations(
        &self,
        _ids: &[Uuid],
    ) -> Result<Vec<Song>, DomainError> {
        unavailable()
    }
}
