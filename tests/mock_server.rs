//! An in-memory stand-in for the remote backend, used by the integration tests.
//!
//! It implements the same traits as the HTTP client, at the same level: the
//! surface it mimics is what the client exposes *after* status-code mapping
//! (e.g. a server without calendar support makes `check_permissions` answer
//! `Ok(false)` and `delete_reminder` a no-op, because that is what the client
//! maps 404/400 to).
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use corkboard::reminder::{EventPayload, EventRef};
use corkboard::traits::{CalendarBackend, TaskBackend};
use corkboard::{Error, Result, Status, Task, TaskDraft, TaskId, VersionTag};

fn random_version() -> VersionTag {
    VersionTag::from(uuid::Uuid::new_v4().to_hyphenated().to_string())
}

/// This stores some behaviour tweaks, that describe how a mocked server will
/// misbehave during a given test.
///
/// So that an operation fails _n_ times after _m_ initial successes, set
/// `(m, n)` for the suited parameter. Injected failures are HTTP 500s.
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    pub list_tasks: (u32, u32),
    pub create_task: (u32, u32),
    pub update_task: (u32, u32),
    pub patch_status: (u32, u32),
    pub delete_task: (u32, u32),
    pub sync_reminder: (u32, u32),
    pub delete_reminder: (u32, u32),
    pub check_permissions: (u32, u32),
}

impl MockBehaviour {
    /// Every operation will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            list_tasks: (0, n_fails),
            create_task: (0, n_fails),
            update_task: (0, n_fails),
            patch_status: (0, n_fails),
            delete_task: (0, n_fails),
            sync_reminder: (0, n_fails),
            delete_reminder: (0, n_fails),
            check_permissions: (0, n_fails),
        }
    }
}

/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<()> {
    let (remaining_successes, remaining_failures) = *value;

    if remaining_successes > 0 {
        value.0 -= 1;
        Ok(())
    } else if remaining_failures > 0 {
        value.1 -= 1;
        log::debug!("Mock server: failing a {} ({:?})", descr, value);
        Err(Error::Server { status: 500 })
    } else {
        Ok(())
    }
}

/// How many times each operation has been reached (failure injection included,
/// client-side rejections excluded)
#[derive(Default, Clone, Debug)]
pub struct CallCounts {
    pub list_tasks: u32,
    pub create_task: u32,
    pub update_task: u32,
    pub patch_status: u32,
    pub delete_task: u32,
    pub sync_reminder: u32,
    pub delete_reminder: u32,
    pub check_permissions: u32,
}

/// An in-memory task backend. It assigns ids and version tags and answers with
/// canonical records, the way the real backend does.
pub struct MockServer {
    tasks: Vec<Task>,
    next_id: i64,
    events: HashMap<TaskId, EventPayload>,

    /// What `GET /calendar/permissions` would report
    pub permissions_granted: bool,
    /// When false, the sync endpoint is "not implemented": syncing fails with
    /// `CalendarUnavailable` and deleting a reminder is a silent no-op
    pub calendar_supported: bool,
    /// When true, every call answers like an expired session (HTTP 401)
    pub auth_expired: bool,

    behaviour: Mutex<MockBehaviour>,
    counts: Mutex<CallCounts>,
}

impl MockServer {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            events: HashMap::new(),
            permissions_granted: true,
            calendar_supported: true,
            auth_expired: false,
            behaviour: Mutex::new(MockBehaviour::default()),
            counts: Mutex::new(CallCounts::default()),
        }
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    pub fn counts(&self) -> CallCounts {
        self.counts.lock().unwrap().clone()
    }

    /// Put a task into the server directly, as if another client had created it
    pub fn seed(&mut self, draft: TaskDraft) -> Task {
        let task = Task::new_with_parameters(
            TaskId::from(self.next_id),
            draft,
            None,
            random_version(),
        );
        self.next_id += 1;
        self.tasks.push(task.clone());
        task
    }

    /// Rewrite the version of a task, as if another client had just edited it
    pub fn touch(&mut self, id: TaskId) {
        if let Some(index) = self.tasks.iter().position(|task| task.id() == id) {
            let known = self.tasks[index].clone();
            self.tasks[index] = Task::new_with_parameters(
                known.id(),
                known.to_draft(),
                known.calendar_event_id().map(str::to_string),
                random_version(),
            );
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn event(&self, id: TaskId) -> Option<&EventPayload> {
        self.events.get(&id)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn check_auth(&self) -> Result<()> {
        if self.auth_expired {
            Err(Error::AuthRequired)
        } else {
            Ok(())
        }
    }

    fn find_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id() == id)
            // The real backend answers 404 for an id it does not know
            .ok_or(Error::UnexpectedStatus { status: 404 })
    }
}

#[async_trait]
impl TaskBackend for MockServer {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.counts.lock().unwrap().list_tasks += 1;
        self.check_auth()?;
        decrement(&mut self.behaviour.lock().unwrap().list_tasks, "list_tasks")?;
        Ok(self.tasks.clone())
    }

    async fn create_task(&mut self, draft: &TaskDraft) -> Result<Task> {
        self.counts.lock().unwrap().create_task += 1;
        self.check_auth()?;
        decrement(&mut self.behaviour.lock().unwrap().create_task, "create_task")?;
        draft
            .validate()
            .map_err(|err| Error::BadRequest(err.to_string()))?;
        Ok(self.seed(draft.clone()))
    }

    async fn update_task(&mut self, id: TaskId, version: &VersionTag, edit: &TaskDraft) -> Result<Task> {
        self.counts.lock().unwrap().update_task += 1;
        self.check_auth()?;
        decrement(&mut self.behaviour.lock().unwrap().update_task, "update_task")?;
        edit.validate()
            .map_err(|err| Error::BadRequest(err.to_string()))?;
        let version = version.clone();
        let slot = self.find_mut(id)?;
        if slot.version() != &version {
            return Err(Error::Conflict);
        }
        let updated = Task::new_with_parameters(
            id,
            edit.clone(),
            slot.calendar_event_id().map(str::to_string),
            random_version(),
        );
        *slot = updated.clone();
        Ok(updated)
    }

    async fn patch_status(&mut self, id: TaskId, version: &VersionTag, status: Status) -> Result<Task> {
        self.counts.lock().unwrap().patch_status += 1;
        self.check_auth()?;
        decrement(&mut self.behaviour.lock().unwrap().patch_status, "patch_status")?;
        let version = version.clone();
        let slot = self.find_mut(id)?;
        if slot.version() != &version {
            return Err(Error::Conflict);
        }
        let mut draft = slot.to_draft();
        draft.status = status;
        let updated = Task::new_with_parameters(
            id,
            draft,
            slot.calendar_event_id().map(str::to_string),
            random_version(),
        );
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.counts.lock().unwrap().delete_task += 1;
        self.check_auth()?;
        decrement(&mut self.behaviour.lock().unwrap().delete_task, "delete_task")?;
        self.find_mut(id)?;
        self.tasks.retain(|task| task.id() != id);
        Ok(())
    }
}

#[async_trait]
impl CalendarBackend for MockServer {
    async fn sync_reminder(&mut self, id: TaskId, payload: &EventPayload) -> Result<EventRef> {
        self.counts.lock().unwrap().sync_reminder += 1;
        self.check_auth()?;
        if !self.calendar_supported {
            return Err(Error::CalendarUnavailable);
        }
        decrement(&mut self.behaviour.lock().unwrap().sync_reminder, "sync_reminder")?;
        // Upsert by task id: a re-sync replaces the event instead of adding one
        self.events.insert(id, payload.clone());
        Ok(EventRef { event_id: format!("evt-{}", id) })
    }

    async fn delete_reminder(&mut self, id: TaskId) -> Result<()> {
        self.counts.lock().unwrap().delete_reminder += 1;
        self.check_auth()?;
        if !self.calendar_supported {
            // The HTTP client maps the 404 of a missing endpoint to a no-op
            return Ok(());
        }
        decrement(&mut self.behaviour.lock().unwrap().delete_reminder, "delete_reminder")?;
        self.events.remove(&id);
        Ok(())
    }

    async fn check_permissions(&self) -> Result<bool> {
        self.counts.lock().unwrap().check_permissions += 1;
        self.check_auth()?;
        decrement(&mut self.behaviour.lock().unwrap().check_permissions, "check_permissions")?;
        Ok(self.permissions_granted)
    }
}
