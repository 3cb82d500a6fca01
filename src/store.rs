//! The locally cached task collection.
//!
//! The backend is the source of truth; the [`TaskStore`] keeps a local copy so
//! that the UI can render and filter without a round-trip. The copy is replaced
//! wholesale by [`refresh`](TaskStore::refresh) and patched entry-by-entry from
//! the canonical records that every mutating call returns. No operation touches
//! the local collection before the corresponding remote call has succeeded.

use crate::error::{Error, Result};
use crate::filter::{self, TaskFilter};
use crate::task::{Status, Task, TaskDraft, TaskId, VersionTag};
use crate::traits::TaskBackend;

/// A filterable cache of the user's tasks, kept consistent with a remote backend
pub struct TaskStore<B: TaskBackend> {
    backend: B,
    tasks: Vec<Task>,
}

impl<B: TaskBackend> TaskStore<B> {
    /// Create a store with an empty local collection. Call
    /// [`refresh`](Self::refresh) to populate it.
    pub fn new(backend: B) -> Self {
        Self { backend, tasks: Vec::new() }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The local collection, in the order the backend returned it
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Apply a client-side filter to the local collection. Pure: the
    /// collection itself is left as-is.
    pub fn filtered(&self, filter: &TaskFilter) -> Vec<Task> {
        filter::apply(&self.tasks, filter)
    }

    /// Re-fetch the whole collection, replacing the local copy.
    ///
    /// On failure the local copy is left unchanged, so the UI keeps showing
    /// the last known state next to the error.
    pub async fn refresh(&mut self) -> Result<&[Task]> {
        let fresh = self.backend.list_tasks().await?;
        log::debug!("Fetched {} tasks", fresh.len());
        self.tasks = fresh;
        Ok(&self.tasks)
    }

    /// Validate and persist a new task; the canonical record the backend
    /// returns is appended to the local collection.
    pub async fn create(&mut self, draft: TaskDraft) -> Result<Task> {
        draft.validate()?;
        let created = self.backend.create_task(&draft).await?;
        log::debug!("Created task {}", created.id());
        self.tasks.push(created.clone());
        Ok(created)
    }

    /// Replace every user-writable field of a task.
    ///
    /// The edit is based on the locally known revision; if the task changed on
    /// the server in the meantime this fails with [`Error::Conflict`] and the
    /// local collection is left unchanged. Refresh and re-apply in that case.
    pub async fn update(&mut self, id: TaskId, edit: TaskDraft) -> Result<Task> {
        edit.validate()?;
        let version = self.known_version(id)?;
        let updated = self.backend.update_task(id, &version, &edit).await?;
        self.replace(updated.clone());
        Ok(updated)
    }

    /// Change only the status of a task
    pub async fn patch_status(&mut self, id: TaskId, status: Status) -> Result<Task> {
        let version = self.known_version(id)?;
        let updated = self.backend.patch_status(id, &version, status).await?;
        self.replace(updated.clone());
        Ok(updated)
    }

    /// Delete a task.
    ///
    /// The remote call runs first: when it fails, the entry stays in the local
    /// collection and nothing is lost.
    pub async fn delete(&mut self, id: TaskId) -> Result<()> {
        self.backend.delete_task(id).await?;
        self.tasks.retain(|task| task.id() != id);
        log::debug!("Deleted task {}", id);
        Ok(())
    }

    /// Record the calendar event reference on the local copy.
    ///
    /// The calendar side-channel reports its outcome to the orchestrating
    /// caller, which attaches it here; it never mutates the store itself.
    pub fn attach_calendar_event(&mut self, id: TaskId, event_id: Option<String>) {
        if let Some(task) = self.tasks.iter_mut().find(|task| task.id() == id) {
            task.set_calendar_event_id(event_id);
        }
    }

    fn known_version(&self, id: TaskId) -> Result<VersionTag> {
        match self.task(id) {
            Some(task) => Ok(task.version().clone()),
            None => Err(Error::UnknownTask { id }),
        }
    }

    fn replace(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|known| known.id() == task.id()) {
            Some(slot) => *slot = task,
            None => {
                // A refresh may have dropped the entry while the call was in flight
                log::warn!("Task {} was missing from the local collection, re-adding it", task.id());
                self.tasks.push(task);
            }
        }
    }
}
