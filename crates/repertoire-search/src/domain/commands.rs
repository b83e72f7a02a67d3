//! Search commands carried over the bus.
//!
//! Lifecycle handlers never talk to the engine directly for mutations; they
//! publish one of these and the dispatch handlers execute it. Each command
//! names the user whose action caused it so the resulting task can be
//! correlated back.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::documents::{DocumentId, DocumentUpdate, SearchDocument};

/// Payload of `AddToSearchEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToSearchEngine {
    /// User whose action produced the documents.
    pub user_id: Uuid,
    /// Documents to upsert.
    pub documents: Vec<SearchDocument>,
}

/// Payload of `UpdateFromSearchEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFromSearchEngine {
    /// User whose action produced the updates.
    pub user_id: Uuid,
    /// Rebuilt documents and sparse patches to merge.
    pub documents: Vec<DocumentUpdate>,
}

/// Payload of `DeleteFromSearchEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFromSearchEngine {
    /// User whose action removed the documents.
    pub user_id: Uuid,
    /// Ids to remove; absent ids are ignored by the engine.
    pub ids: Vec<DocumentId>,
}
