//! `PostgreSQL` implementation of the catalog repository traits.
//!
//! Associations are loaded with one query per table and stitched together in
//! memory, so a bulk read costs a fixed number of round trips however many
//! ids it is given.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use repertoire_core::error::DomainError;
use repertoire_core::model::{Album, Artist, Song};
use repertoire_core::repository::{AlbumRepository, ArtistRepository, SongRepository};

use crate::rows::{AlbumRow, ArtistRow, SongRow};

const SELECT_ARTIST: &str = "
    SELECT id, user_id, name, image_url, created_at, updated_at
    FROM artists WHERE id = $1";

const SELECT_ARTISTS_BY_IDS: &str = "
    SELECT id, user_id, name, image_url, created_at, updated_at
    FROM artists WHERE id = ANY($1)";

const SELECT_ALBUM: &str = "
    SELECT id, user_id, title, release_date, image_url, artist_id, created_at, updated_at
    FROM albums WHERE id = $1";

const SELECT_ALBUMS_BY_IDS: &str = "
    SELECT id, user_id, title, release_date, image_url, artist_id, created_at, updated_at
    FROM albums WHERE id = ANY($1) ORDER BY id";

const SELECT_ALBUMS_BY_ARTIST: &str = "
    SELECT id, user_id, title, release_date, image_url, artist_id, created_at, updated_at
    FROM albums WHERE artist_id = $1 ORDER BY id";

const SELECT_SONG: &str = "
    SELECT id, user_id, title, release_date, image_url, artist_id, album_id, created_at, updated_at
    FROM songs WHERE id = $1";

const SELECT_SONGS_BY_IDS: &str = "
    SELECT id, user_id, title, release_date, image_url, artist_id, album_id, created_at, updated_at
    FROM songs WHERE id = ANY($1) ORDER BY id";

const SELECT_SONGS_BY_ARTIST: &str = "
    SELECT id, user_id, title, release_date, image_url, artist_id, album_id, created_at, updated_at
    FROM songs WHERE artist_id = $1 ORDER BY id";

const SELECT_SONGS_BY_ALBUMS: &str = "
    SELECT id, user_id, title, release_date, image_url, artist_id, album_id, created_at, updated_at
    FROM songs WHERE album_id = ANY($1) ORDER BY id";

/// PostgreSQL-backed catalog reads.
#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Creates a new `PgCatalogRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn artist(&self, id: Uuid) -> Result<Option<Artist>, DomainError> {
        let row = sqlx::query_as::<_, ArtistRow>(SELECT_ARTIST)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(row.map(Artist::from))
    }

    async fn artists_by_id(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Artist>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, ArtistRow>(SELECT_ARTISTS_BY_IDS)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows
            .into_iter()
            .map(Artist::from)
            .map(|artist| (artist.id, artist))
            .collect())
    }

    async fn album(&self, id: Uuid) -> Result<Option<Album>, DomainError> {
        let row = sqlx::query_as::<_, AlbumRow>(SELECT_ALBUM)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(row.map(Album::from))
    }

    async fn albums(&self, sql: &str, key: &[Uuid]) -> Result<Vec<Album>, DomainError> {
        let rows = sqlx::query_as::<_, AlbumRow>(sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Album::from).collect())
    }

    async fn songs(&self, sql: &str, key: &[Uuid]) -> Result<Vec<Song>, DomainError> {
        let rows = sqlx::query_as::<_, SongRow>(sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Song::from).collect())
    }

    async fn albums_by_artist(&self, artist_id: Uuid) -> Result<Vec<Album>, DomainError> {
        let rows = sqlx::query_as::<_, AlbumRow>(SELECT_ALBUMS_BY_ARTIST)
            .bind(artist_id)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Album::from).collect())
    }

    async fn songs_by_artist(&self, artist_id: Uuid) -> Result<Vec<Song>, DomainError> {
        let rows = sqlx::query_as::<_, SongRow>(SELECT_SONGS_BY_ARTIST)
            .bind(artist_id)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Song::from).collect())
    }

    /// Populates `artist` on every album from a single artist lookup.
    async fn attach_album_artists(&self, albums: &mut [Album]) -> Result<(), DomainError> {
        let artist_ids = distinct(albums.iter().filter_map(|album| album.artist_id));
        let artists = self.artists_by_id(&artist_ids).await?;
        for album in albums {
            album.artist = album
                .artist_id
                .and_then(|id| artists.get(&id).cloned())
                .map(Box::new);
        }
        Ok(())
    }
}

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[async_trait]
impl ArtistRepository for PgCatalogRepository {
    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Artist, DomainError> {
        self.artist(id)
            .await?
            .ok_or_else(|| DomainError::not_found("artist", id))
    }

    #[instrument(skip(self))]
    async fn get_with_associations(&self, id: Uuid) -> Result<Artist, DomainError> {
        let mut artist = self
            .artist(id)
            .await?
            .ok_or_else(|| DomainError::not_found("artist", id))?;
        artist.albums = self.albums_by_artist(id).await?;
        artist.songs = self.songs_by_artist(id).await?;
        Ok(artist)
    }
}

#[async_trait]
impl AlbumRepository for PgCatalogRepository {
    #[instrument(skip(self))]
    async fn get_with_artist(&self, id: Uuid) -> Result<Album, DomainError> {
        let mut album = self
            .album(id)
            .await?
            .ok_or_else(|| DomainError::not_found("album", id))?;
        if let Some(artist_id) = album.artist_id {
            album.artist = self.artist(artist_id).await?.map(Box::new);
        }
        Ok(album)
    }

    #[instrument(skip(self))]
    async fn get_with_associations(&self, id: Uuid) -> Result<Album, DomainError> {
        let mut album = self.get_with_artist(id).await?;
        album.songs = self.songs(SELECT_SONGS_BY_ALBUMS, &[id]).await?;
        Ok(album)
    }

    #[instrument(skip_all, fields(count = ids.len()))]
    async fn get_all_by_ids_with_songs(&self, ids: &[Uuid]) -> Result<Vec<Album>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut albums = self.albums(SELECT_ALBUMS_BY_IDS, ids).await?;
        self.attach_album_artists(&mut albums).await?;

        let album_ids: Vec<Uuid> = albums.iter().map(|album| album.id).collect();
        let mut songs_by_album: HashMap<Uuid, Vec<Song>> = HashMap::new();
        for song in self.songs(SELECT_SONGS_BY_ALBUMS, &album_ids).await? {
            if let Some(album_id) = song.album_id {
                songs_by_album.entry(album_id).or_default().push(song);
            }
        }
        for album in &mut albums {
            album.songs = songs_by_album.remove(&album.id).unwrap_or_default();
        }
        Ok(albums)
    }
}

#[async_trait]
impl SongRepository for PgCatalogRepository {
    #[instrument(skip(self))]
    async fn get_with_associations(&self, id: Uuid) -> Result<Song, DomainError> {
        let row = sqlx::query_as::<_, SongRow>(SELECT_SONG)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        let mut song = row
            .map(Song::from)
            .ok_or_else(|| DomainError::not_found("song", id))?;
        if let Some(artist_id) = song.artist_id {
            song.artist = self.artist(artist_id).await?.map(Box::new);
        }
        if let Some(album_id) = song.album_id {
            song.album = self.album(album_id).await?.map(Box::new);
        }
        Ok(song)
    }

    #[instrument(skip_all, fields(count = ids.len()))]
    async fn get_all_by_ids_with_associations(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Song>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut songs = self.songs(SELECT_SONGS_BY_IDS, ids).await?;

        let artist_ids = distinct(songs.iter().filter_map(|song| song.artist_id));
        let artists = self.artists_by_id(&artist_ids).await?;
        let album_ids = distinct(songs.iter().filter_map(|song| song.album_id));
        let albums: HashMap<Uuid, Album> = if album_ids.is_empty() {
            HashMap::new()
        } else {
            self.albums(SELECT_ALBUMS_BY_IDS, &album_ids)
                .await?
                .into_iter()
                .map(|album| (album.id, album))
                .collect()
        };

        for song in &mut songs {
            song.artist = song
                .artist_id
                .and_then(|id| artists.get(&id).cloned())
                .map(Box::new);
            song.album = song
                .album_id
                .and_then(|id| albums.get(&id).cloned())
                .map(Box::new);
        }
        Ok(songs)
    }
}
