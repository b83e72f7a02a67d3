//! The removal routine shared by every Deleted handler.
//!
//! Two phases run in order, each idempotent on its own: first the search
//! index is brought in line (delete removed documents, patch the children
//! that only lost their parent), then storage cleanup is requested for
//! every removed entity. There is no transaction across the two; a failure
//! in either returns the error and redelivery repeats both.

use repertoire_core::error::DomainError;
use repertoire_search::domain::documents::{
    AlbumPatch, DocumentId, DocumentPatch, DocumentType, DocumentUpdate, SearchDocument, SongPatch,
};
use repertoire_search::domain::filter::{DocumentFilter, ParentRef};
use tracing::info;
use uuid::Uuid;

use super::context::SyncContext;

/// Everything one Deleted event removes.
#[derive(Debug)]
pub(crate) struct Removal {
    user_id: Uuid,
    ids: Vec<DocumentId>,
    paths: Vec<String>,
    orphans: Vec<DocumentFilter>,
}

/// The patch clearing `parent` on `document`, when it embeds one.
fn unlink_patch(document: &SearchDocument, parent: ParentRef) -> Option<DocumentUpdate> {
    let patch = match (parent, document) {
        (ParentRef::Artist, SearchDocument::Album(album)) => DocumentPatch::Album(AlbumPatch {
            id: album.id,
            artist: Some(None),
        }),
        (ParentRef::Artist, SearchDocument::Song(song)) => DocumentPatch::Song(SongPatch {
            id: song.id,
            artist: Some(None),
            album: None,
        }),
        (ParentRef::Album, SearchDocument::Song(song)) => DocumentPatch::Song(SongPatch {
            id: song.id,
            artist: None,
            album: Some(None),
        }),
        _ => return None,
    };
    Some(DocumentUpdate::Patch(patch))
}

impl Removal {
    pub(crate) fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            ids: Vec::new(),
            paths: Vec::new(),
            orphans: Vec::new(),
        }
    }

    /// Marks one entity as removed: its document and its directory.
    pub(crate) fn remove(&mut self, doc_type: DocumentType, id: Uuid, directory: String) {
        let id = DocumentId::new(doc_type, id);
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
        if !self.paths.contains(&directory) {
            self.paths.push(directory);
        }
    }

    /// Asks for `doc_type` documents referencing any of `parent_ids` through
    /// `parent` to have that reference cleared.
    pub(crate) fn unlink(&mut self, doc_type: DocumentType, parent: ParentRef, parent_ids: &[Uuid]) {
        self.orphans.push(DocumentFilter::ReferencesParent {
            doc_type,
            parent,
            parent_ids: parent_ids.to_vec(),
        });
    }

    async fn orphan_patches(&self, ctx: &SyncContext) -> Result<Vec<DocumentUpdate>, DomainError> {
        let mut patches: Vec<DocumentUpdate> = Vec::new();
        for filter in &self.orphans {
            let DocumentFilter::ReferencesParent { parent, .. } = filter else {
                continue;
            };
            for document in ctx.engine.get_documents(filter).await? {
                if self.ids.contains(&document.id()) {
                    continue;
                }
                if let Some(patch) = unlink_patch(&document, *parent)
                    && !patches.iter().any(|p| p.id() == patch.id())
                {
                    patches.push(patch);
                }
            }
        }
        Ok(patches)
    }

    /// Publishes the index commands, then the storage cleanup.
    pub(crate) async fn execute(self, ctx: &SyncContext) -> Result<(), DomainError> {
        if self.ids.is_empty() {
            return Ok(());
        }

        ctx.delete_documents(self.user_id, self.ids.clone()).await?;

        let patches = self.orphan_patches(ctx).await?;
        let unlinked = patches.len();
        if !patches.is_empty() {
            ctx.update_documents(self.user_id, patches).await?;
        }

        let directories = self.paths.len();
        ctx.storage.delete_directories(self.paths).await?;

        info!(
            user_id = %self.user_id,
            deleted = self.ids.len(),
            unlinked,
            directories,
            "removal published"
        );
        Ok(())
    }
}
