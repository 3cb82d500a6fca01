//! Turning task deadlines into calendar events.
//!
//! This module only builds the outgoing event representation; actually sending
//! it is the job of a [`CalendarBackend`](crate::traits::CalendarBackend), and
//! deciding whether to send it at all is the job of the
//! [`Provider`](crate::provider::Provider).

use chrono::offset::LocalResult;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::{Priority, Task};

/// Reminders span a fixed one-hour window on the morning of the deadline
const EVENT_START_HOUR: u32 = 9;
const EVENT_END_HOUR: u32 = 10;

/// How the calendar should nudge the user, in minutes before the event start
const REMINDER_OFFSETS: [(ReminderMethod, u32); 3] = [
    (ReminderMethod::Email, 24 * 60),
    (ReminderMethod::Email, 10),
    (ReminderMethod::Popup, 60),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

/// One notification attached to an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReminder {
    pub method: ReminderMethod,
    pub minutes: u32,
}

/// The event sent to the backend's per-task sync endpoint.
///
/// Create and update are the same wire call: the backend upserts by task id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub summary: String,
    pub description: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub color_id: String,
    pub reminders: Vec<EventReminder>,
}

impl EventPayload {
    /// Build the calendar event mirroring `task`.
    ///
    /// Fails fast with [`Error::InvalidTask`] when the task has no deadline or
    /// no assignment name to derive the summary from; no remote call is made
    /// in that case.
    pub fn for_task(task: &Task) -> Result<Self> {
        if task.assignment().trim().is_empty() {
            return Err(Error::InvalidTask {
                reason: "the assignment name is empty".to_string(),
            });
        }
        let deadline = match task.deadline() {
            Some(deadline) => deadline,
            None => {
                return Err(Error::InvalidTask {
                    reason: "the task has no deadline".to_string(),
                })
            }
        };

        let (start_time, end_time) = event_window(deadline.date())?;

        Ok(Self {
            summary: format!("Due: {}", task.assignment()),
            description: format!(
                "Class: {}\nAssignment: {}\nPriority: {}",
                task.class_name(),
                task.assignment(),
                task.priority(),
            ),
            start_time,
            end_time,
            color_id: color_id(task.priority()).to_string(),
            reminders: REMINDER_OFFSETS
                .iter()
                .map(|&(method, minutes)| EventReminder { method, minutes })
                .collect(),
        })
    }
}

/// The event window for a deadline: 09:00 to 10:00 local time on the
/// deadline's calendar date.
pub fn event_window(date: NaiveDate) -> Result<(DateTime<Local>, DateTime<Local>)> {
    let start = at_local_time(date, EVENT_START_HOUR)?;
    let end = at_local_time(date, EVENT_END_HOUR)?;
    Ok((start, end))
}

fn at_local_time(date: NaiveDate, hour: u32) -> Result<DateTime<Local>> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap(/* on-the-hour times always exist */);
    match Local.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Ok(dt),
        // A DST fold makes this wall-clock time happen twice; take the first
        LocalResult::Ambiguous(first, _second) => Ok(first),
        // A DST gap skipped this wall-clock time entirely
        LocalResult::None => Err(Error::InvalidDeadline { value: date.to_string() }),
    }
}

/// Calendar color by priority. The ids are the backend's palette
/// (11 red, 5 yellow, 10 green).
fn color_id(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "11",
        Priority::Medium => "5",
        Priority::Low => "10",
    }
}

/// The backend's reference to a created or refreshed calendar event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRef {
    pub event_id: String,
}

/// What happened to the reminder side-channel of a task operation.
///
/// This is reported next to the task result, never instead of it: once the
/// task call succeeded, no reminder trouble can turn it into a failure.
#[derive(Clone, Debug, PartialEq)]
pub enum ReminderOutcome {
    /// The reminder was created or refreshed
    Synced { event_id: String },
    /// No attempt was made
    Skipped(SkipReason),
    /// The attempt failed; worth showing the user a dismissible warning
    Failed(ReminderWarning),
}

impl ReminderOutcome {
    pub fn is_synced(&self) -> bool {
        match self {
            ReminderOutcome::Synced { .. } => true,
            _ => false,
        }
    }
}

/// Why no reminder synchronization was attempted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The user has not enabled calendar reminders
    RemindersDisabled,
    /// The external calendar has not granted access
    PermissionNotGranted,
    /// There is no deadline to mirror
    NoDeadline,
}

/// A degraded-but-not-fatal reminder failure, for user display
#[derive(Clone, Debug, PartialEq)]
pub enum ReminderWarning {
    /// The backend does not offer calendar synchronization at all
    FeatureUnavailable,
    /// The calendar service failed; retrying later may work
    TemporarilyUnavailable,
    /// The task could not be turned into an event
    InvalidTask(String),
    /// Anything else
    Other(String),
}

impl ReminderWarning {
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::CalendarUnavailable => ReminderWarning::FeatureUnavailable,
            Error::Server { .. } | Error::Network(_) => ReminderWarning::TemporarilyUnavailable,
            Error::InvalidTask { reason } => ReminderWarning::InvalidTask(reason.clone()),
            Error::InvalidDeadline { value } => {
                ReminderWarning::InvalidTask(format!("`{}` is not a valid deadline", value))
            }
            other => ReminderWarning::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ReminderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderWarning::FeatureUnavailable => {
                write!(f, "calendar reminders are not available on this server")
            }
            ReminderWarning::TemporarilyUnavailable => {
                write!(f, "the calendar service is temporarily unavailable")
            }
            ReminderWarning::InvalidTask(reason) => {
                write!(f, "this task cannot be mirrored to the calendar: {}", reason)
            }
            ReminderWarning::Other(detail) => write!(f, "reminder synchronization failed: {}", detail),
        }
    }
}
