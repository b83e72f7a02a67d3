//! Test search engine: an in-memory index with call recording.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use repertoire_core::error::DomainError;
use repertoire_search::domain::documents::{
    DocumentId, DocumentPatch, DocumentUpdate, SearchDocument,
};
use repertoire_search::domain::filter::DocumentFilter;
use repertoire_search::engine::{SearchEngine, SearchQuery, SearchResults, TaskUid};

/// A call received by [`FakeSearchEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Search(SearchQuery),
    Add(Vec<DocumentId>),
    Update(Vec<DocumentUpdate>),
    Delete(Vec<DocumentId>),
    GetDocument(DocumentId),
    GetDocuments(DocumentFilter),
}

/// An in-memory index. Mutations apply immediately and return increasing
/// task uids starting at 1; filters are evaluated with
/// [`DocumentFilter::matches`].
#[derive(Debug, Default)]
pub struct FakeSearchEngine {
    documents: Mutex<HashMap<DocumentId, SearchDocument>>,
    calls: Mutex<Vec<EngineCall>>,
    last_task: AtomicI64,
    failing: AtomicBool,
}

fn merge(document: &mut SearchDocument, patch: &DocumentPatch) {
    match (document, patch) {
        (SearchDocument::Album(album), DocumentPatch::Album(patch)) => {
            if let Some(artist) = &patch.artist {
                album.artist.clone_from(artist);
            }
        }
        (SearchDocument::Song(song), DocumentPatch::Song(patch)) => {
            if let Some(artist) = &patch.artist {
                song.artist.clone_from(artist);
            }
            if let Some(album) = &patch.album {
                song.album.clone_from(album);
            }
        }
        _ => {}
    }
}

impl FakeSearchEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with an infrastructure error.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Places `document` in the index without recording a call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed(&self, document: SearchDocument) {
        self.documents
            .lock()
            .unwrap()
            .insert(document.id(), document);
    }

    /// Returns the indexed document with `id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn document(&self, id: &DocumentId) -> Option<SearchDocument> {
        self.documents.lock().unwrap().get(id).cloned()
    }

    /// Number of indexed documents.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of all calls received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Filters passed to `get_documents`, in order.
    pub fn discovery_filters(&self) -> Vec<DocumentFilter> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::GetDocuments(filter) => Some(filter),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: EngineCall) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure("search engine unavailable".into()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn next_task(&self) -> TaskUid {
        TaskUid(self.last_task.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn sorted(mut documents: Vec<SearchDocument>) -> Vec<SearchDocument> {
        documents.sort_by_key(|doc| doc.id().to_string());
        documents
    }
}

fn text_of(document: &SearchDocument) -> &str {
    match document {
        SearchDocument::Artist(doc) => &doc.name,
        SearchDocument::Album(doc) => &doc.title,
        SearchDocument::Song(doc) => &doc.title,
        SearchDocument::Playlist(doc) => &doc.title,
    }
}

#[async_trait]
impl SearchEngine for FakeSearchEngine {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, DomainError> {
        self.record(EngineCall::Search(query.clone()))?;
        let needle = query.query.to_lowercase();
        let matching: Vec<SearchDocument> = self
            .documents
            .lock()
            .unwrap()
            .values()
            .filter(|doc| doc.user_id() == query.user_id)
            .filter(|doc| query.doc_type.is_none_or(|t| doc.doc_type() == t))
            .filter(|doc| text_of(doc).to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let matching = Self::sorted(matching);
        let total_count = matching.len() as u64;
        let hits = match query.offset_limit() {
            Some((offset, limit)) => matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            None => matching,
        };
        Ok(SearchResults { hits, total_count })
    }

    async fn add(&self, documents: &[SearchDocument]) -> Result<TaskUid, DomainError> {
        self.record(EngineCall::Add(documents.iter().map(SearchDocument::id).collect()))?;
        let mut index = self.documents.lock().unwrap();
        for document in documents {
            index.insert(document.id(), document.clone());
        }
        Ok(self.next_task())
    }

    async fn update(&self, documents: &[DocumentUpdate]) -> Result<TaskUid, DomainError> {
        self.record(EngineCall::Update(documents.to_vec()))?;
        let mut index = self.documents.lock().unwrap();
        for update in documents {
            match update {
                DocumentUpdate::Full(document) => {
                    index.insert(document.id(), document.clone());
                }
                DocumentUpdate::Patch(patch) => {
                    if let Some(document) = index.get_mut(&patch.id()) {
                        merge(document, patch);
                    }
                }
            }
        }
        Ok(self.next_task())
    }

    async fn delete(&self, ids: &[DocumentId]) -> Result<TaskUid, DomainError> {
        self.record(EngineCall::Delete(ids.to_vec()))?;
        let mut index = self.documents.lock().unwrap();
        for id in ids {
            index.remove(id);
        }
        Ok(self.next_task())
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<SearchDocument>, DomainError> {
        self.record(EngineCall::GetDocument(*id))?;
        Ok(self.document(id))
    }

    async fn get_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<Vec<SearchDocument>, DomainError> {
        self.record(EngineCall::GetDocuments(filter.clone()))?;
        let matching = self
            .documents
            .lock()
            .unwrap()
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        Ok(Self::sorted(matching))
    }
}
