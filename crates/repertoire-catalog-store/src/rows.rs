//! Row types as selected from the catalog tables.

use chrono::{DateTime, NaiveDate, Utc};
use repertoire_core::model::{Album, Artist, Song};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(crate) struct ArtistRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ArtistRow> for Artist {
    fn from(row: ArtistRow) -> Self {
        let mut artist = Artist::new(row.id, row.user_id, row.name, row.created_at);
        artist.image_url = row.image_url;
        artist.updated_at = row.updated_at;
        artist
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct AlbumRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    release_date: Option<NaiveDate>,
    image_url: Option<String>,
    artist_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AlbumRow> for Album {
    fn from(row: AlbumRow) -> Self {
        let mut album = Album::new(row.id, row.user_id, row.title, row.created_at);
        album.release_date = row.release_date;
        album.image_url = row.image_url;
        album.artist_id = row.artist_id;
        album.updated_at = row.updated_at;
        album
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SongRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    release_date: Option<NaiveDate>,
    image_url: Option<String>,
    artist_id: Option<Uuid>,
    album_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        let mut song = Song::new(row.id, row.user_id, row.title, row.created_at);
        song.release_date = row.release_date;
        song.image_url = row.image_url;
        song.artist_id = row.artist_id;
        song.album_id = row.album_id;
        song.updated_at = row.updated_at;
        song
    }
}
