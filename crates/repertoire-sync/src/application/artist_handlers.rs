//! Artist lifecycle handlers.

use async_trait::async_trait;
use repertoire_bus::Topic;
use repertoire_core::error::DomainError;
use repertoire_core::model::Artist;
use repertoire_search::domain::documents::{
    AlbumPatch, DocumentId, DocumentPatch, DocumentType, DocumentUpdate, SongPatch,
};
use repertoire_search::domain::filter::ParentRef;
use tracing::instrument;

use super::context::SyncContext;
use super::deletion::Removal;
use super::projection::{artist_document, artist_summary};
use super::registry::LifecycleEvent;
use crate::domain::events::{
    ArtistCreated, ArtistDeleted, ArtistUpdated, ArtistsDeleted, ChildDisposition,
};

#[async_trait]
impl LifecycleEvent for ArtistCreated {
    const TOPIC: Topic = Topic::ArtistCreated;
    const HANDLER: &'static str = "artist.created";

    #[instrument(skip_all, fields(artist_id = %self.artist.id))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        ctx.add_documents(self.artist.user_id, vec![artist_document(&self.artist)])
            .await
    }
}

/// Rebuilds the artist and patches the artist summary embedded in each of
/// its albums and songs. Patches for children not yet indexed leave partial
/// documents until their Add lands, as with `AlbumsUpdated`.
#[async_trait]
impl LifecycleEvent for ArtistUpdated {
    const TOPIC: Topic = Topic::ArtistUpdated;
    const HANDLER: &'static str = "artist.updated";

    #[instrument(skip_all, fields(artist_id = %self.id))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        let artist = ctx.artists.get_with_associations(self.id).await?;
        let summary = artist_summary(&artist);

        let mut batch: Vec<DocumentUpdate> = vec![artist_document(&artist).into()];
        for album in &artist.albums {
            batch.push(DocumentUpdate::Patch(DocumentPatch::Album(AlbumPatch {
                id: DocumentId::new(DocumentType::Album, album.id),
                artist: Some(Some(summary.clone())),
            })));
        }
        for song in &artist.songs {
            batch.push(DocumentUpdate::Patch(DocumentPatch::Song(SongPatch {
                id: DocumentId::new(DocumentType::Song, song.id),
                artist: Some(Some(summary.clone())),
                album: None,
            })));
        }
        ctx.update_documents(artist.user_id, batch).await
    }
}

#[async_trait]
impl LifecycleEvent for ArtistDeleted {
    const TOPIC: Topic = Topic::ArtistDeleted;
    const HANDLER: &'static str = "artist.deleted";

    #[instrument(skip_all, fields(artist_id = %self.artist.id, children = ?self.children))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        remove_artists(ctx, &[self.artist], self.children).await
    }
}

#[async_trait]
impl LifecycleEvent for ArtistsDeleted {
    const TOPIC: Topic = Topic::ArtistsDeleted;
    const HANDLER: &'static str = "artists.deleted";

    #[instrument(skip_all, fields(count = self.artists.len(), children = ?self.children))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        remove_artists(ctx, &self.artists, self.children).await
    }
}

async fn remove_artists(
    ctx: &SyncContext,
    artists: &[Artist],
    children: ChildDisposition,
) -> Result<(), DomainError> {
    let Some(first) = artists.first() else {
        return Ok(());
    };
    let mut removal = Removal::new(first.user_id);

    for artist in artists {
        removal.remove(
            DocumentType::Artist,
            artist.id,
            ctx.storage.artist_directory(artist),
        );
        if children == ChildDisposition::Cascade {
            for album in &artist.albums {
                removal.remove(DocumentType::Album, album.id, ctx.storage.album_directory(album));
                for song in &album.songs {
                    removal.remove(DocumentType::Song, song.id, ctx.storage.song_directory(song));
                }
            }
            for song in &artist.songs {
                removal.remove(DocumentType::Song, song.id, ctx.storage.song_directory(song));
            }
        }
    }

    if children == ChildDisposition::Unlink {
        let parent_ids: Vec<_> = artists.iter().map(|artist| artist.id).collect();
        removal.unlink(DocumentType::Album, ParentRef::Artist, &parent_ids);
        removal.unlink(DocumentType::Song, ParentRef::Artist, &parent_ids);
    }

    removal.execute(ctx).await
}
