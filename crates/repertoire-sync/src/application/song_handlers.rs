//! Song lifecycle handlers. Songs have no children, so deletes never
//! unlink anything.

use async_trait::async_trait;
use repertoire_bus::Topic;
use repertoire_core::error::DomainError;
use repertoire_core::model::Song;
use repertoire_search::domain::documents::DocumentType;
use tracing::{debug, instrument};

use super::context::SyncContext;
use super::deletion::Removal;
use super::projection::{
    album_document, artist_document, loaded_song_document, push_unique, song_document,
};
use super::registry::LifecycleEvent;
use crate::domain::events::{SongCreated, SongDeleted, SongUpdated, SongsDeleted, SongsUpdated};

/// Adds the song together with its resolved artist and album. The album's
/// own artist is reused from the song when they are the same one.
#[async_trait]
impl LifecycleEvent for SongCreated {
    const TOPIC: Topic = Topic::SongCreated;
    const HANDLER: &'static str = "song.created";

    #[instrument(skip_all, fields(song_id = %self.song.id))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        let song = &self.song;
        let artist = ctx
            .resolve_artist(song.artist.as_deref(), song.artist_id)
            .await?;
        let album = ctx
            .resolve_album(song.album.as_deref(), song.album_id)
            .await?;

        let mut batch = vec![song_document(song, artist.as_ref(), album.as_ref())];
        if let Some(artist) = &artist {
            push_unique(&mut batch, artist_document(artist));
        }
        if let Some(album) = &album {
            let same_artist = artist
                .as_ref()
                .filter(|artist| album.artist_id == Some(artist.id));
            let album_artist = ctx
                .resolve_artist(album.artist.as_deref().or(same_artist), album.artist_id)
                .await?;
            push_unique(&mut batch, album_document(album, album_artist.as_ref()));
        }
        ctx.add_documents(song.user_id, batch).await
    }
}

#[async_trait]
impl LifecycleEvent for SongUpdated {
    const TOPIC: Topic = Topic::SongUpdated;
    const HANDLER: &'static str = "song.updated";

    #[instrument(skip_all, fields(song_id = %self.id))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        let song = ctx.songs.get_with_associations(self.id).await?;
        ctx.update_documents(song.user_id, vec![loaded_song_document(&song).into()])
            .await
    }
}

#[async_trait]
impl LifecycleEvent for SongsUpdated {
    const TOPIC: Topic = Topic::SongsUpdated;
    const HANDLER: &'static str = "songs.updated";

    #[instrument(skip_all, fields(count = self.ids.len()))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        if self.ids.is_empty() {
            return Ok(());
        }
        let songs = ctx.songs.get_all_by_ids_with_associations(&self.ids).await?;
        let Some(first) = songs.first() else {
            debug!("none of the songs exist any more");
            return Ok(());
        };
        let batch = songs
            .iter()
            .map(|song| loaded_song_document(song).into())
            .collect();
        ctx.update_documents(first.user_id, batch).await
    }
}

#[async_trait]
impl LifecycleEvent for SongDeleted {
    const TOPIC: Topic = Topic::SongDeleted;
    const HANDLER: &'static str = "song.deleted";

    #[instrument(skip_all, fields(song_id = %self.song.id))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        remove_songs(ctx, &[self.song]).await
    }
}

#[async_trait]
impl LifecycleEvent for SongsDeleted {
    const TOPIC: Topic = Topic::SongsDeleted;
    const HANDLER: &'static str = "songs.deleted";

    #[instrument(skip_all, fields(count = self.songs.len()))]
    async fn apply(self, ctx: &SyncContext) -> Result<(), DomainError> {
        remove_songs(ctx, &self.songs).await
    }
}

async fn remove_songs(ctx: &SyncContext, songs: &[Song]) -> Result<(), DomainError> {
    let Some(first) = songs.first() else {
        return Ok(());
    };
    let mut removal = Removal::new(first.user_id);
    for song in songs {
        removal.remove(DocumentType::Song, song.id, ctx.storage.song_directory(song));
    }
    removal.execute(ctx).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use repertoire_bus::{Publisher, TopicRegistry};
    use repertoire_core::model::{Album, Artist};
    use repertoire_core::storage::DirectoryLayout;
    use repertoire_search::domain::documents::{DocumentId, DocumentUpdate, SearchDocument};
    use repertoire_test_support::FailingBus;
    use uuid::Uuid;

    use super::*;
    use crate::application::projection::{album_summary, artist_summary};
    use crate::application::storage_cleanup::StorageCleanupPublisher;
    use crate::application::test_fixture::Fixture;

    #[tokio::test]
    async fn test_created_with_foreign_keys_adds_song_artist_and_album() {
        // Arrange
        let f = Fixture::new();
        let artist = f.artist("Muse");
        let album = f.album("Origin of Symmetry", Some(&artist));
        let song = f.song("Plug In Baby", Some(&artist), Some(&album));

        // Act
        f.dispatch(&SongCreated { song: song.clone() }).await.unwrap();

        // Assert
        let adds = f.adds();
        assert_eq!(adds.len(), 1);
        let docs = &adds[0].documents;
        assert_eq!(docs.len(), 3);
        let SearchDocument::Song(song_doc) = &docs[0] else {
            panic!("expected the song document first");
        };
        assert_eq!(song_doc.artist, Some(artist_summary(&artist)));
        assert_eq!(song_doc.album, Some(album_summary(&album)));
        assert_eq!(docs[1], artist_document(&artist));
        assert_eq!(docs[2], album_document(&album, Some(&artist)));
    }

    #[tokio::test]
    async fn test_created_with_new_artist_embedded_reuses_it_for_album() {
        // Arrange
        let f = Fixture::new();
        let artist = Artist::new(Uuid::new_v4(), f.user_id, "Muse", f.at);
        let mut album = Album::new(Uuid::new_v4(), f.user_id, "Showbiz", f.at);
        album.artist_id = Some(artist.id);
        let mut song = Song::new(Uuid::new_v4(), f.user_id, "Sunburn", f.at);
        song.artist_id = Some(artist.id);
        song.artist = Some(Box::new(artist.clone()));
        song.album_id = Some(album.id);
        song.album = Some(Box::new(album.clone()));

        // Act
        f.dispatch(&SongCreated { song }).await.unwrap();

        // Assert
        let adds = f.adds();
        assert_eq!(adds[0].documents.len(), 3);
        assert_eq!(adds[0].documents[2], album_document(&album, Some(&artist)));
    }

    #[tokio::test]
    async fn test_created_with_missing_album_aborts() {
        let f = Fixture::new();
        let mut song = f.song("Loose", None, None);
        song.album_id = Some(Uuid::new_v4());

        let result = f.dispatch(&SongCreated { song }).await;

        assert!(matches!(result, Err(DomainError::NotFound { entity: "album", .. })));
        assert!(f.adds().is_empty());
    }

    #[tokio::test]
    async fn test_updated_uses_current_associations() {
        // Arrange
        let f = Fixture::new();
        let artist = f.artist("Muse");
        let mut song = f.song("Madness", None, None);
        song.artist_id = Some(artist.id);
        f.catalog.insert_song(&song);

        // Act
        f.dispatch(&SongUpdated { id: song.id }).await.unwrap();

        // Assert
        let updates = f.updates();
        let [DocumentUpdate::Full(SearchDocument::Song(doc))] = updates[0].documents.as_slice()
        else {
            panic!("expected one full song document");
        };
        assert_eq!(doc.artist, Some(artist_summary(&artist)));
    }

    #[tokio::test]
    async fn test_bulk_update_rebuilds_every_existing_song() {
        let f = Fixture::new();
        let first = f.song("Resistance", None, None);
        let second = f.song("Undisclosed Desires", None, None);

        f.dispatch(&SongsUpdated {
            ids: vec![first.id, Uuid::new_v4(), second.id],
        })
        .await
        .unwrap();

        let ids: Vec<DocumentId> = f.updates()[0]
            .documents
            .iter()
            .map(DocumentUpdate::id)
            .collect();
        assert_eq!(
            ids,
            vec![
                DocumentId::new(DocumentType::Song, first.id),
                DocumentId::new(DocumentType::Song, second.id),
            ]
        );
    }

    #[tokio::test]
    async fn test_bulk_delete_removes_ids_and_directories() {
        // Arrange
        let f = Fixture::new();
        let first = f.song("Resistance", None, None);
        let second = f.song("Exogenesis", None, None);

        // Act
        f.dispatch(&SongsDeleted {
            songs: vec![first.clone(), second.clone()],
        })
        .await
        .unwrap();

        // Assert
        assert_eq!(f.deletes()[0].ids.len(), 2);
        assert!(f.engine.discovery_filters().is_empty());
        assert_eq!(
            f.cleanups()[0].paths,
            vec![
                f.ctx.storage.song_directory(&first),
                f.ctx.storage.song_directory(&second),
            ]
        );
    }

    #[tokio::test]
    async fn test_bus_failure_is_returned_for_redelivery() {
        // Arrange
        let f = Fixture::new();
        let publisher = Publisher::new(Arc::new(FailingBus), Arc::new(TopicRegistry::default()));
        let ctx = SyncContext {
            publisher: publisher.clone(),
            storage: StorageCleanupPublisher::new(
                publisher,
                Arc::new(DirectoryLayout::default()),
            ),
            ..f.ctx.clone()
        };
        let song = f.song("Starlight", None, None);

        // Act
        let result = SongDeleted { song }.apply(&ctx).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
