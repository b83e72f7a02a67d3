//! Commands this crate sends to services outside the search pipeline.

use serde::{Deserialize, Serialize};

/// Payload of `DeleteDirectoriesStorage`, consumed by the storage service.
/// Removing a directory that is already gone is a no-op there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDirectoriesStorage {
    pub paths: Vec<String>,
}
