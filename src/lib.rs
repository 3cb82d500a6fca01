//! This crate manages a user's assignment tasks, stored on a remote server.
//!
//! It provides an HTTP client to the task backend in the [`client`] module, and a
//! local, filterable cache of the task collection in the [`store`] module: the
//! backend stays the source of truth, the cache is what the UI renders from.
//!
//! On top of these, a [`Provider`](provider::Provider) accompanies task operations with a
//! best-effort calendar reminder synchronization: deadlines are mirrored into an
//! external calendar when the user enabled it and the calendar granted access,
//! and any trouble on that side-channel is reported as a dismissible warning,
//! never as a failure of the task operation itself.

pub mod traits;

mod task;
pub use task::{Deadline, Priority, Status, Task, TaskDraft, TaskId, VersionTag};
pub mod filter;
pub use filter::TaskFilter;
pub mod error;
pub use error::{Error, Result};
pub mod reminder;
pub use reminder::{ReminderOutcome, ReminderWarning, SkipReason};
pub mod store;
pub use store::TaskStore;
pub mod provider;
pub use provider::Provider;

pub mod client;
pub use client::Client;
pub mod config;
pub use config::Config;
