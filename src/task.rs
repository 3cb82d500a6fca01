//! Assignment tasks, as stored on the backend

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// The identifier of a [`Task`], assigned by the backend at creation time.
///
/// Treat it as opaque: the only things you can do with an id are compare it and
/// hand it back to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl From<i64> for TaskId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// The workflow state of a task.
///
/// Tasks move freely between these states through explicit user action. There
/// is no terminal state other than deletion, which removes the task entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Default for Status {
    fn default() -> Self {
        Status::Pending
    }
}

impl Status {
    /// The string the backend uses for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

/// How urgent a task is. This only affects display and reminder colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    /// The string the backend uses for this priority
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

/// An opaque revision marker, assigned by the backend every time a task is created or modified.
///
/// Updates send it back as an `If-Match` precondition, so that two clients
/// editing the same task cannot silently overwrite each other: a stale tag is
/// rejected with [`Error::Conflict`](crate::error::Error::Conflict).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag {
    tag: String,
}

impl From<String> for VersionTag {
    fn from(tag: String) -> VersionTag {
        Self { tag }
    }
}

impl VersionTag {
    /// Get the inner revision marker
    pub fn as_str(&self) -> &str {
        &self.tag
    }
}

/// The deadline of a task, a wall-clock date and time with no timezone attached.
///
/// Call sites historically sent either a bare date (`2025-03-10`) or a full
/// timestamp. Parsing accepts both (a bare date means midnight), but this crate
/// always serializes the canonical full form, `2025-03-10T00:00:00`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(NaiveDateTime);

impl Deadline {
    /// Parse a deadline from a bare date, a naive timestamp, or an RFC 3339 timestamp.
    ///
    /// RFC 3339 inputs keep their wall-clock reading (the date and time as
    /// written; the offset is dropped). Anything else, including impossible
    /// dates such as `2025-02-30`, is an [`Error::InvalidDeadline`].
    pub fn parse(input: &str) -> Result<Self> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self(dt));
        }
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(input) {
            return Ok(Self(dt.naive_local()));
        }
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Ok(Self(date.and_hms_opt(0, 0, 0).unwrap(/* midnight exists on every day */)));
        }
        Err(Error::InvalidDeadline { value: input.to_string() })
    }

    /// The calendar date this deadline falls on
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn naive(&self) -> &NaiveDateTime {
        &self.0
    }
}

impl From<NaiveDateTime> for Deadline {
    fn from(dt: NaiveDateTime) -> Self {
        Self(dt)
    }
}

impl FromStr for Deadline {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for Deadline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
    }
}

/// Canonical full-timestamp form
impl Serialize for Deadline {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
/// Lenient form: also accepts the legacy bare-date encoding
impl<'de> Deserialize<'de> for Deadline {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Deadline, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Deadline::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// An assignment task, as the backend owns it.
///
/// Instances always come from the backend: every mutating call returns the
/// canonical record, which replaces the local copy. The local collection held
/// by a [`TaskStore`](crate::store::TaskStore) is only a cache of these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Assigned by the backend, immutable afterwards
    id: TaskId,

    /// The class/course this assignment belongs to
    class_name: String,
    /// The display name of the assignment
    assignment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default)]
    status: Status,
    #[serde(default)]
    priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    deadline: Option<Deadline>,

    /// Reference to the mirrored calendar event, present only if a reminder was
    /// successfully synchronized. A task has at most one calendar event at a
    /// time: re-syncing supersedes the previous one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calendar_event_id: Option<String>,

    /// The backend revision of this record
    version: VersionTag,
}

impl Task {
    /// Create a Task instance from its raw parts.
    ///
    /// Production records come deserialized straight from the backend; this
    /// constructor mostly serves mocked backends and tests.
    pub fn new_with_parameters(
        id: TaskId,
        draft: TaskDraft,
        calendar_event_id: Option<String>,
        version: VersionTag,
    ) -> Self {
        Self {
            id,
            class_name: draft.class_name,
            assignment: draft.assignment,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            deadline: draft.deadline,
            calendar_event_id,
            version,
        }
    }

    pub fn id(&self) -> TaskId { self.id }
    pub fn class_name(&self) -> &str { &self.class_name }
    pub fn assignment(&self) -> &str { &self.assignment }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn status(&self) -> Status { self.status }
    pub fn priority(&self) -> Priority { self.priority }
    pub fn deadline(&self) -> Option<Deadline> { self.deadline }
    pub fn calendar_event_id(&self) -> Option<&str> { self.calendar_event_id.as_deref() }
    pub fn version(&self) -> &VersionTag { &self.version }

    /// Attach (or detach) the reference to the mirrored calendar event.
    ///
    /// The calendar side-channel never touches tasks itself; the orchestrating
    /// caller records the outcome here.
    pub fn set_calendar_event_id(&mut self, event_id: Option<String>) {
        self.calendar_event_id = event_id;
    }

    /// The user-editable fields of this task, e.g. to pre-fill an edit form
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            class_name: self.class_name.clone(),
            assignment: self.assignment.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            deadline: self.deadline,
        }
    }
}

/// The user-writable fields of a task: what a create or edit form submits.
///
/// A draft has no `id` and no `version`; the backend assigns both.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub class_name: String,
    pub assignment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Deadline>,
}

impl TaskDraft {
    /// Create a draft with the two required fields; the rest keeps its defaults
    pub fn new<S: ToString, T: ToString>(class_name: S, assignment: T) -> Self {
        Self {
            class_name: class_name.to_string(),
            assignment: assignment.to_string(),
            ..Self::default()
        }
    }

    /// Check the required fields are filled in.
    ///
    /// This runs before any network call: an invalid draft never reaches the
    /// backend.
    pub fn validate(&self) -> Result<()> {
        if self.class_name.trim().is_empty() {
            return Err(Error::Validation { field: "className" });
        }
        if self.assignment.trim().is_empty() {
            return Err(Error::Validation { field: "assignment" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_accepts_bare_dates() {
        let deadline = Deadline::parse("2025-03-10").unwrap();
        assert_eq!(deadline.date(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(deadline.to_string(), "2025-03-10T00:00:00");
    }

    #[test]
    fn deadline_accepts_full_timestamps() {
        let deadline = Deadline::parse("2025-03-10T17:30:00").unwrap();
        assert_eq!(deadline.date(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(deadline.to_string(), "2025-03-10T17:30:00");
    }

    #[test]
    fn deadline_keeps_the_wall_clock_reading_of_rfc3339_inputs() {
        let deadline = Deadline::parse("2025-03-10T23:30:00+11:00").unwrap();
        assert_eq!(deadline.date(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    }

    #[test]
    fn deadline_rejects_garbage_and_impossible_dates() {
        assert!(matches!(Deadline::parse("soon"), Err(Error::InvalidDeadline { .. })));
        assert!(matches!(Deadline::parse(""), Err(Error::InvalidDeadline { .. })));
        assert!(matches!(Deadline::parse("2025-02-30"), Err(Error::InvalidDeadline { .. })));
    }

    #[test]
    fn drafts_with_empty_required_fields_fail_validation() {
        let draft = TaskDraft::new("CS101", "   ");
        match draft.validate() {
            Err(Error::Validation { field }) => assert_eq!(field, "assignment"),
            other => panic!("expected a validation error, got {:?}", other),
        }

        let draft = TaskDraft::new("", "HW1");
        match draft.validate() {
            Err(Error::Validation { field }) => assert_eq!(field, "className"),
            other => panic!("expected a validation error, got {:?}", other),
        }

        assert!(TaskDraft::new("CS101", "HW1").validate().is_ok());
    }

    #[test]
    fn tasks_use_the_backend_field_names() {
        let json = r#"{
            "id": 42,
            "className": "CS101",
            "assignment": "HW1",
            "status": "in-progress",
            "priority": "high",
            "deadline": "2025-03-10",
            "version": "v1"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id(), TaskId::from(42));
        assert_eq!(task.class_name(), "CS101");
        assert_eq!(task.status(), Status::InProgress);
        assert_eq!(task.priority(), Priority::High);
        assert_eq!(task.deadline().unwrap().to_string(), "2025-03-10T00:00:00");
        assert_eq!(task.calendar_event_id(), None);

        let round_trip = serde_json::to_value(&task).unwrap();
        assert_eq!(round_trip["className"], "CS101");
        assert_eq!(round_trip["deadline"], "2025-03-10T00:00:00");
        assert_eq!(round_trip["status"], "in-progress");
    }

    #[test]
    fn missing_status_and_priority_fall_back_to_defaults() {
        let json = r#"{ "id": 7, "className": "MATH200", "assignment": "Problem set 3", "version": "v1" }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status(), Status::Pending);
        assert_eq!(task.priority(), Priority::Medium);
    }
}
