//! Typed document filters for synchronous index reads.

use uuid::Uuid;

use super::documents::{DocumentType, SearchDocument};

/// The parent relation a child document summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    /// The embedded `artist` summary.
    Artist,
    /// The embedded `album` summary.
    Album,
}

impl ParentRef {
    /// Filterable attribute holding the parent's id.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            ParentRef::Artist => "artist.id",
            ParentRef::Album => "album.id",
        }
    }
}

/// Selects documents for `SearchEngine::get_documents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFilter {
    /// Documents of `doc_type` whose `parent` summary points at one of
    /// `parent_ids`.
    ReferencesParent {
        doc_type: DocumentType,
        parent: ParentRef,
        parent_ids: Vec<Uuid>,
    },
    /// Every document owned by the user.
    OwnedBy(Uuid),
}

impl DocumentFilter {
    /// Renders the filter in the engine's expression syntax.
    #[must_use]
    pub fn to_expression(&self) -> String {
        match self {
            DocumentFilter::ReferencesParent {
                doc_type,
                parent,
                parent_ids,
            } => {
                let ids = parent_ids
                    .iter()
                    .map(|id| format!("\"{id}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("type = {doc_type} AND {} IN [{ids}]", parent.attribute())
            }
            DocumentFilter::OwnedBy(user_id) => format!("userId = \"{user_id}\""),
        }
    }

    /// Evaluates the filter against a document in memory.
    #[must_use]
    pub fn matches(&self, document: &SearchDocument) -> bool {
        match self {
            DocumentFilter::ReferencesParent {
                doc_type,
                parent,
                parent_ids,
            } => {
                let reference = match parent {
                    ParentRef::Artist => document.artist_ref(),
                    ParentRef::Album => document.album_ref(),
                };
                document.doc_type() == *doc_type
                    && reference.is_some_and(|id| parent_ids.contains(&id))
            }
            DocumentFilter::OwnedBy(user_id) => document.user_id() == *user_id,
        }
    }
}
