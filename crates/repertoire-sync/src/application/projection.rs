//! Catalog entity to search document projections.
//!
//! Parent summaries are copied from whatever parent the caller resolved;
//! the builders never look anything up.

use repertoire_core::model::{Album, Artist, Song};
use repertoire_search::domain::documents::{
    AlbumSearch, AlbumSummary, ArtistSearch, ArtistSummary, DocumentId, DocumentType,
    SearchDocument, SongSearch,
};

#[must_use]
pub fn artist_summary(artist: &Artist) -> ArtistSummary {
    ArtistSummary {
        id: artist.id,
        name: artist.name.clone(),
        image_url: artist.image_url.clone(),
        updated_at: artist.updated_at,
    }
}

#[must_use]
pub fn album_summary(album: &Album) -> AlbumSummary {
    AlbumSummary {
        id: album.id,
        title: album.title.clone(),
        image_url: album.image_url.clone(),
        updated_at: album.updated_at,
    }
}

#[must_use]
pub fn artist_document(artist: &Artist) -> SearchDocument {
    SearchDocument::Artist(ArtistSearch {
        id: DocumentId::new(DocumentType::Artist, artist.id),
        user_id: artist.user_id,
        name: artist.name.clone(),
        image_url: artist.image_url.clone(),
        created_at: artist.created_at,
        updated_at: artist.updated_at,
    })
}

/// Builds an album document embedding `artist`.
#[must_use]
pub fn album_document(album: &Album, artist: Option<&Artist>) -> SearchDocument {
    SearchDocument::Album(AlbumSearch {
        id: DocumentId::new(DocumentType::Album, album.id),
        user_id: album.user_id,
        title: album.title.clone(),
        release_date: album.release_date,
        image_url: album.image_url.clone(),
        artist: artist.map(artist_summary),
        created_at: album.created_at,
        updated_at: album.updated_at,
    })
}

/// Builds a song document embedding `artist` and `album`.
#[must_use]
pub fn song_document(song: &Song, artist: Option<&Artist>, album: Option<&Album>) -> SearchDocument {
    SearchDocument::Song(SongSearch {
        id: DocumentId::new(DocumentType::Song, song.id),
        user_id: song.user_id,
        title: song.title.clone(),
        release_date: song.release_date,
        image_url: song.image_url.clone(),
        artist: artist.map(artist_summary),
        album: album.map(album_summary),
        created_at: song.created_at,
        updated_at: song.updated_at,
    })
}

/// Album document using the album's loaded artist.
#[must_use]
pub fn loaded_album_document(album: &Album) -> SearchDocument {
    album_document(album, album.artist.as_deref())
}

/// Song document using the song's loaded artist and album.
#[must_use]
pub fn loaded_song_document(song: &Song) -> SearchDocument {
    song_document(song, song.artist.as_deref(), song.album.as_deref())
}

/// Appends `document` unless a document with the same id is already in
/// `batch`.
pub fn push_unique(batch: &mut Vec<SearchDocument>, document: SearchDocument) {
    let id = document.id();
    if !batch.iter().any(|existing| existing.id() == id) {
        batch.push(document);
    }
}
