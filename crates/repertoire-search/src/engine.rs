//! Search engine abstraction.

use std::fmt;

use async_trait::async_trait;
use repertoire_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::documents::{DocumentId, DocumentType, DocumentUpdate, SearchDocument};
use crate::domain::filter::DocumentFilter;

/// Status the engine reports for a task that completed successfully.
pub const TASK_SUCCEEDED: &str = "succeeded";

/// Engine-assigned identifier of an asynchronous indexing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskUid(pub i64);

impl fmt::Display for TaskUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A user-scoped full-text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text query.
    pub query: String,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Results per page.
    pub page_size: Option<u32>,
    /// Restricts results to one document type.
    pub doc_type: Option<DocumentType>,
    /// Caller; results are always restricted to this user's documents.
    pub user_id: Uuid,
    /// Additional filter expressions, all of which must hold.
    pub filters: Vec<String>,
    /// Sort expressions, e.g. `updatedAt:desc`.
    pub sort: Vec<String>,
}

impl SearchQuery {
    /// Creates an unpaginated, unfiltered query for `user_id`.
    #[must_use]
    pub fn new(query: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            query: query.into(),
            page: None,
            page_size: None,
            doc_type: None,
            user_id,
            filters: Vec::new(),
            sort: Vec::new(),
        }
    }

    /// The combined filter: the mandatory user clause, the optional type
    /// clause, and the caller's filters as one parenthesized group.
    #[must_use]
    pub fn filter_expression(&self) -> String {
        let mut clauses = vec![format!("userId = \"{}\"", self.user_id)];
        if let Some(doc_type) = self.doc_type {
            clauses.push(format!("type = {doc_type}"));
        }
        if !self.filters.is_empty() {
            let group = self
                .filters
                .iter()
                .map(|f| format!("({f})"))
                .collect::<Vec<_>>()
                .join(" AND ");
            clauses.push(format!("({group})"));
        }
        clauses.join(" AND ")
    }

    /// `(offset, limit)` when both page and page size are given.
    #[must_use]
    pub fn offset_limit(&self) -> Option<(u32, u32)> {
        let (page, page_size) = (self.page?, self.page_size?);
        Some((page.saturating_sub(1).saturating_mul(page_size), page_size))
    }
}

/// One page of search hits.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    /// Matching documents.
    pub hits: Vec<SearchDocument>,
    /// Total number of matches across all pages.
    pub total_count: u64,
}

/// Executes reads and asynchronous mutations against the search index.
///
/// Mutations are fire-and-forget: the engine enqueues them and returns a
/// task id without waiting for completion. Add and update are upserts by id
/// and deleting an absent id is a no-op, so every mutation may be repeated.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Runs a user-scoped query.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, DomainError>;

    /// Enqueues an upsert of `documents`.
    async fn add(&self, documents: &[SearchDocument]) -> Result<TaskUid, DomainError>;

    /// Enqueues a merge of `documents` into the stored documents.
    async fn update(&self, documents: &[DocumentUpdate]) -> Result<TaskUid, DomainError>;

    /// Enqueues deletion of `ids`.
    async fn delete(&self, ids: &[DocumentId]) -> Result<TaskUid, DomainError>;

    /// Fetches a single document.
    async fn get_document(&self, id: &DocumentId) -> Result<Option<SearchDocument>, DomainError>;

    /// Fetches every document matching `filter`.
    async fn get_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<Vec<SearchDocument>, DomainError>;

    /// Classifies a task status reported by the engine.
    fn has_task_succeeded(&self, status: &str) -> bool {
        status == TASK_SUCCEEDED
    }
}
