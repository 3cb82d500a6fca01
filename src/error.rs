//! The errors this crate reports.
//!
//! Task operations always surface their errors to the caller, so that the UI
//! layer can report them. Calendar reminder errors are different: the caller is
//! expected to downgrade them to warnings, since a reminder is a best-effort
//! side-channel that must never fail the task operation it accompanies (see
//! [`Provider`](crate::provider::Provider)).

/// Convenience alias for results of this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field is missing or empty. Detected before any network call,
    /// never retried.
    #[error("required field `{field}` must not be empty")]
    Validation { field: &'static str },

    /// A deadline that is not a date. Never silently patched up: the caller
    /// decides what to do with it.
    #[error("`{value}` is not a valid deadline")]
    InvalidDeadline { value: String },

    /// The task cannot be mirrored to the calendar (no deadline, or no
    /// assignment name to derive the event summary from).
    #[error("task cannot be mirrored to the calendar: {reason}")]
    InvalidTask { reason: String },

    /// The id does not match any task in the local collection (it may have
    /// been deleted, or the collection refreshed, since the caller last saw it)
    #[error("no locally known task with id {id}")]
    UnknownTask { id: crate::task::TaskId },

    /// HTTP 401. The session is gone; the caller must prompt for
    /// re-authentication and must not retry.
    #[error("authentication required")]
    AuthRequired,

    /// HTTP 400, with the server-provided message when there is one
    #[error("the server rejected the request: {0}")]
    BadRequest(String),

    /// HTTP 409/412: the task changed on the server since it was last fetched.
    /// Re-fetch and re-apply the edit.
    #[error("the task was modified by someone else in the meantime")]
    Conflict,

    /// HTTP 5xx, usually transient
    #[error("the server is temporarily unavailable (HTTP {status})")]
    Server { status: u16 },

    /// The request never got an HTTP response
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 404/400 from a calendar endpoint: the backend does not offer
    /// calendar synchronization. Not an alarming condition; callers log it and
    /// move on.
    #[error("calendar synchronization is not available on this server")]
    CalendarUnavailable,

    /// Any other non-success status code
    #[error("unexpected HTTP status code {status}")]
    UnexpectedStatus { status: u16 },

    /// The response body was not what the backend promised
    #[error("unable to decode the server response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid client configuration (e.g. an unparseable base URL)
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether retrying the exact same call can possibly succeed.
    ///
    /// Validation and auth errors need user action first; conflict errors need
    /// a re-fetch.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Server { .. } | Error::Network(_) => true,
            _ => false,
        }
    }
}
