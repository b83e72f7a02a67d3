//! Album lifecycle handlers.

use async_trait::async_trait;
use repertoire_bus::Topic;
use repertoire_core::error::DomainError;
use repertoire_core::model::Album;
use repertoire_search::domain::documents::{
    DocumentId, DocumentPatch, DocumentType, DocumentUpdate, SongPatch,
};
use repertoire_search::domain::filter::ParentRef;
use tracing::{debug, instrument};

use super::context::SyncContext;
use super::deletion::Removal;
use super::projection::{
    album_document, album_summary, artist_document, artist_summary, loaded_album_document,
    push_unique,
};
use super::registry::LifecycleEvent;
use crate::domain::events::{
    AlbumCreated, AlbumDeleted, AlbumUpdated, AlbumsDeleted, AlbumsUpdated, ChildDisposition,
};

#[async_trait]
impl LifecycleEvent for AlbumCreated {
    const TOPIC: Topic = Topic::AlbumCreated;
    const HANDLER: &'static str = "album.created";

    #[instrument(skip_all, fields(album_id = %self.album.id))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        let album = &self.album;
        let artist = ctx
            .resolve_artist(album.artist.as_deref(), album.artist_id)
            .await?;

        let mut batch = vec![album_document(album, artist.as_ref())];
        if let Some(artist) = &artist {
            push_unique(&mut batch, artist_document(artist));
        }
        ctx.add_documents(album.user_id, batch).await
    }
}

#[async_trait]
impl LifecycleEvent for AlbumUpdated {
    const TOPIC: Topic = Topic::AlbumUpdated;
    const HANDLER: &'static str = "album.updated";

    #[instrument(skip_all, fields(album_id = %self.id))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        let album = ctx.albums.get_with_associations(self.id).await?;
        ctx.update_documents(album.user_id, vec![loaded_album_document(&album).into()])
            .await
    }
}

/// Rebuilds each album and refreshes the copies its songs hold. Songs are
/// patched rather than rebuilt: only the album summary, and the artist
/// summary when the song shares the album's artist, are rewritten.
///
/// A patch is an upsert on the index. If this runs before a song's
/// `SongCreated`, the index briefly holds a partial song without `userId`
/// or `title`. User-scoped search never returns it, and the song's Add
/// replaces it in full.
#[async_trait]
impl LifecycleEvent for AlbumsUpdated {
    const TOPIC: Topic = Topic::AlbumsUpdated;
    const HANDLER: &'static str = "albums.updated";

    #[instrument(skip_all, fields(count = self.ids.len()))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        if self.ids.is_empty() {
            return Ok(());
        }
        let albums = ctx.albums.get_all_by_ids_with_songs(&self.ids).await?;
        let Some(first) = albums.first() else {
            debug!("none of the albums exist any more");
            return Ok(());
        };

        let mut batch: Vec<DocumentUpdate> = Vec::new();
        for album in &albums {
            batch.push(loaded_album_document(album).into());
            let summary = album_summary(album);
            let artist = album.artist.as_deref();
            for song in &album.songs {
                let shared_artist = artist
                    .filter(|artist| song.artist_id == Some(artist.id))
                    .map(|artist| Some(artist_summary(artist)));
                batch.push(DocumentUpdate::Patch(DocumentPatch::Song(SongPatch {
                    id: DocumentId::new(DocumentType::Song, song.id),
                    artist: shared_artist,
                    album: Some(Some(summary.clone())),
                })));
            }
        }
        ctx.update_documents(first.user_id, batch).await
    }
}

#[async_trait]
impl LifecycleEvent for AlbumDeleted {
    const TOPIC: Topic = Topic::AlbumDeleted;
    const HANDLER: &'static str = "album.deleted";

    #[instrument(skip_all, fields(album_id = %self.album.id, children = ?self.children))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        remove_albums(ctx, &[self.album], self.children).await
    }
}

#[async_trait]
impl LifecycleEvent for AlbumsDeleted {
    const TOPIC: Topic = Topic::AlbumsDeleted;
    const HANDLER: &'static str = "albums.deleted";

    #[instrument(skip_all, fields(count = self.albums.len(), children = ?self.children))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        remove_albums(ctx, &self.albums, self.children).await
    }
}

async fn remove_albums(
    ctx: &SyncContext,
    albums: &[Album],
    children: ChildDisposition,
) -> Result<(), DomainError> {
    let Some(first) = albums.first() else {
        return Ok(());
    };
    let mut removal = Removal::new(first.user_id);

    for album in albums {
        removal.remove(DocumentType::Album, album.id, ctx.storage.album_directory(album));
        if children == ChildDisposition::Cascade {
            for song in &album.songs {
                removal.remove(DocumentType::Song, song.id, ctx.storage.song_directory(song));
            }
        }
    }

    if children == ChildDisposition::Unlink {
        let parent_ids: Vec<_> = albums.iter().map(|album| album.id).collect();
        removal.unlink(DocumentType::Song, ParentRef::Album, &parent_ids);
    }

    removal.execute(ctx).await
}
