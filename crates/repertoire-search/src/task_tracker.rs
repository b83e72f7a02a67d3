//! Correlation of indexing tasks with the users who caused them.

use std::time::Duration;

use moka::sync::Cache;
use uuid::Uuid;

use crate::engine::TaskUid;

const MAX_TRACKED_TASKS: u64 = 100_000;

/// Short-lived `task uid -> user id` map, written right after every mutating
/// engine call and read when the engine reports the task finished.
///
/// Entries are never deleted explicitly; a lookup after the TTL is a miss,
/// which callers treat as "nobody to notify".
pub struct TaskTracker {
    entries: Cache<TaskUid, Uuid>,
}

impl std::fmt::Debug for TaskTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskTracker")
            .field("tracked", &self.entries.entry_count())
            .finish()
    }
}

impl TaskTracker {
    /// Creates a tracker whose correlations live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(MAX_TRACKED_TASKS)
                .build(),
        }
    }

    /// Records that `user_id` triggered `task_uid`.
    pub fn track(&self, task_uid: TaskUid, user_id: Uuid) {
        self.entries.insert(task_uid, user_id);
    }

    /// Returns the user that triggered `task_uid`, if still tracked.
    #[must_use]
    pub fn user_for(&self, task_uid: TaskUid) -> Option<Uuid> {
        self.entries.get(&task_uid)
    }
}
