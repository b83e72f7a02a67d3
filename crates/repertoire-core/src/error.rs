//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type shared by every stage of the search-sync pipeline.
///
/// Handlers return these to the bus unchanged; anything other than a
/// successful result triggers redelivery of the message.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A collaborator fetch found no such entity.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind that was looked up.
        entity: &'static str,
        /// The identifier that was looked up.
        id: Uuid,
    },

    /// A payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A topic name or queue lookup is not part of the registry.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// A validation error on caller-supplied input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure error (repository, search index, bus, broker).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// The search index reported that an asynchronous task did not succeed.
    #[error("indexing task {task_uid} failed with status {status}")]
    TaskFailed {
        /// The engine-assigned task identifier.
        task_uid: i64,
        /// The status reported by the engine.
        status: String,
    },
}

impl DomainError {
    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Returns `true` if redelivering the failed message could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Infrastructure(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
