//! This module combines the task store and the calendar side-channel.
//!
//! A [`Provider`] runs every task operation through the
//! [`TaskStore`](crate::store::TaskStore) and, where it makes sense,
//! accompanies it with a best-effort calendar reminder synchronization. The
//! reminder leg can only ever degrade to a warning: once the task call has
//! succeeded, nothing the calendar does (or fails to do) can undo that.

use crate::error::Error;
use crate::error::Result;
use crate::filter::TaskFilter;
use crate::reminder::{EventPayload, ReminderOutcome, ReminderWarning, SkipReason};
use crate::store::TaskStore;
use crate::task::{Status, Task, TaskDraft, TaskId};
use crate::traits::{CalendarBackend, TaskBackend};

/// A task source that mirrors deadlines into an external calendar when it can.
///
/// Reminder synchronization is attempted only when the user enabled it, the
/// external calendar granted access, and the task has a deadline. The
/// permission check runs once and is remembered; call
/// [`invalidate_permissions`](Self::invalidate_permissions) after the
/// authorization flow completes.
pub struct Provider<B: TaskBackend + CalendarBackend> {
    store: TaskStore<B>,
    reminders_enabled: bool,
    permissions_granted: Option<bool>,
}

impl<B: TaskBackend + CalendarBackend> Provider<B> {
    pub fn new(backend: B, reminders_enabled: bool) -> Self {
        Self {
            store: TaskStore::new(backend),
            reminders_enabled,
            permissions_granted: None,
        }
    }

    /// The underlying store, e.g. to read or filter the local collection
    pub fn store(&self) -> &TaskStore<B> {
        &self.store
    }
    pub fn store_mut(&mut self) -> &mut TaskStore<B> {
        &mut self.store
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn filtered(&self, filter: &TaskFilter) -> Vec<Task> {
        self.store.filtered(filter)
    }

    pub fn reminders_enabled(&self) -> bool {
        self.reminders_enabled
    }

    /// Flip the user preference. Existing reminders are left alone; the next
    /// create or edit acts on the new setting.
    pub fn set_reminders_enabled(&mut self, enabled: bool) {
        self.reminders_enabled = enabled;
    }

    /// Re-fetch the task collection. No calendar traffic is involved.
    pub async fn refresh(&mut self) -> Result<&[Task]> {
        self.store.refresh().await
    }

    /// Create a task, then mirror its deadline into the calendar if possible.
    ///
    /// The reminder outcome is reported next to the created task. It is never
    /// an error of this call: a task that is on the server but has no reminder
    /// is a success with a warning attached.
    pub async fn create_task(&mut self, draft: TaskDraft) -> Result<(Task, ReminderOutcome)> {
        let task = self.store.create(draft).await?;
        let outcome = self.sync_reminder_for(&task).await;
        self.record_outcome(task.id(), &outcome);
        Ok((task, outcome))
    }

    /// Edit a task, then refresh its calendar reminder if possible.
    ///
    /// The backend upserts the event by task id, so a moved deadline updates
    /// the existing event rather than creating a second one.
    pub async fn update_task(&mut self, id: TaskId, edit: TaskDraft) -> Result<(Task, ReminderOutcome)> {
        let task = self.store.update(id, edit).await?;
        let outcome = self.sync_reminder_for(&task).await;
        self.record_outcome(task.id(), &outcome);
        Ok((task, outcome))
    }

    /// Change only the status of a task. Status does not affect the deadline,
    /// so the calendar is left alone.
    pub async fn patch_status(&mut self, id: TaskId, status: Status) -> Result<Task> {
        self.store.patch_status(id, status).await
    }

    /// Delete a task, best-effort deleting its mirrored calendar event first.
    ///
    /// A failed reminder deletion is logged and does not block the task
    /// deletion. A failed task deletion leaves the local collection intact.
    pub async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        let may_have_event = self.reminders_enabled
            || self.store.task(id).map_or(false, |task| task.calendar_event_id().is_some());
        if may_have_event {
            if let Err(err) = self.store.backend_mut().delete_reminder(id).await {
                log::warn!(
                    "Unable to delete the reminder of task {}: {}. Deleting the task anyway.",
                    id, err
                );
            }
        }
        self.store.delete(id).await
    }

    /// Whether the external calendar granted access. Queried once, then remembered.
    pub async fn permissions(&mut self) -> Result<bool> {
        if let Some(granted) = self.permissions_granted {
            return Ok(granted);
        }
        let granted = self.store.backend().check_permissions().await?;
        log::debug!("Calendar permissions granted: {}", granted);
        self.permissions_granted = Some(granted);
        Ok(granted)
    }

    /// Forget the remembered permission state, so the next operation re-checks
    /// (e.g. right after the out-of-band authorization flow finished)
    pub fn invalidate_permissions(&mut self) {
        self.permissions_granted = None;
    }

    async fn sync_reminder_for(&mut self, task: &Task) -> ReminderOutcome {
        if !self.reminders_enabled {
            return ReminderOutcome::Skipped(SkipReason::RemindersDisabled);
        }
        if task.deadline().is_none() {
            return ReminderOutcome::Skipped(SkipReason::NoDeadline);
        }
        match self.permissions().await {
            Ok(true) => {}
            Ok(false) => return ReminderOutcome::Skipped(SkipReason::PermissionNotGranted),
            Err(err) => {
                log::warn!("Unable to check calendar permissions: {}", err);
                return ReminderOutcome::Failed(ReminderWarning::from_error(&err));
            }
        }

        let payload = match EventPayload::for_task(task) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("Task {} cannot be mirrored to the calendar: {}", task.id(), err);
                return ReminderOutcome::Failed(ReminderWarning::from_error(&err));
            }
        };

        match self.store.backend_mut().sync_reminder(task.id(), &payload).await {
            Ok(event_ref) => {
                log::debug!("Reminder of task {} is calendar event {}", task.id(), event_ref.event_id);
                ReminderOutcome::Synced { event_id: event_ref.event_id }
            }
            Err(err) => {
                match &err {
                    Error::CalendarUnavailable => {
                        log::info!("Calendar sync is not available on this server, skipping reminders");
                    }
                    other => {
                        log::warn!("Unable to sync the reminder of task {}: {}", task.id(), other);
                    }
                }
                ReminderOutcome::Failed(ReminderWarning::from_error(&err))
            }
        }
    }

    fn record_outcome(&mut self, id: TaskId, outcome: &ReminderOutcome) {
        if let ReminderOutcome::Synced { event_id } = outcome {
            self.store.attach_calendar_event(id, Some(event_id.clone()));
        }
    }
}
