//! Traits abstracting the remote backend.
//!
//! The HTTP [`Client`](crate::client::Client) is the production implementation.
//! Integration tests plug an in-memory implementation into the same seams, so
//! that store and provider logic can be exercised without a server.

use async_trait::async_trait;

use crate::error::Result;
use crate::reminder::{EventPayload, EventRef};
use crate::task::{Status, Task, TaskDraft, TaskId, VersionTag};

/// The task CRUD surface of the backend.
///
/// Every mutating call returns the canonical record as the backend now stores
/// it; callers replace their local copy with it.
#[async_trait]
pub trait TaskBackend {
    /// Fetch the full task collection of the authenticated user.
    /// The order is whatever the backend returns; no guarantee is made.
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Persist a new task; the backend assigns its id and initial version
    async fn create_task(&mut self, draft: &TaskDraft) -> Result<Task>;

    /// Replace every user-writable field of an existing task.
    /// `version` is the revision the edit was based on; a stale one is
    /// rejected with [`Error::Conflict`](crate::error::Error::Conflict).
    async fn update_task(&mut self, id: TaskId, version: &VersionTag, edit: &TaskDraft) -> Result<Task>;

    /// Change only the status of an existing task
    async fn patch_status(&mut self, id: TaskId, version: &VersionTag, status: Status) -> Result<Task>;

    /// Delete a task. Succeeding means the backend no longer has it.
    async fn delete_task(&mut self, id: TaskId) -> Result<()>;
}

/// The calendar side-channel of the backend.
///
/// All of this is best-effort from the caller's point of view: a backend
/// without calendar support answers
/// [`Error::CalendarUnavailable`](crate::error::Error::CalendarUnavailable)
/// and callers degrade gracefully.
#[async_trait]
pub trait CalendarBackend {
    /// Create or refresh the calendar event mirroring a task. The backend
    /// upserts by task id, so create and update are the same call.
    async fn sync_reminder(&mut self, id: TaskId, payload: &EventPayload) -> Result<EventRef>;

    /// Delete the calendar event mirroring a task, if there is one
    async fn delete_reminder(&mut self, id: TaskId) -> Result<()>;

    /// Whether the external calendar has granted access
    async fn check_permissions(&self) -> Result<bool>;
}
