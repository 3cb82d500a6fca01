//! This module provides a client to connect to the task backend over HTTP.
//!
//! One [`Client`] serves one authenticated session: the [`Config`] it is built
//! from carries the base URL and the session cookie, and every call includes
//! the credentials. HTTP statuses are mapped to the error taxonomy in a single
//! place, so the rest of the crate never sees a status code.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, IF_MATCH};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::reminder::{EventPayload, EventRef};
use crate::task::{Status, Task, TaskDraft, TaskId, VersionTag};
use crate::traits::{CalendarBackend, TaskBackend};

/// A task source that fetches its data from the remote backend
pub struct Client {
    config: Config,
    http: reqwest::Client,
}

impl Client {
    /// Create a client for the given configuration. This does not start a connection.
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.session_cookie() {
            let value = HeaderValue::from_str(cookie)
                .map_err(|err| Error::Config(format!("invalid session cookie: {}", err)))?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The entry point of the out-of-band calendar authorization flow.
    ///
    /// Navigate the user there; the external service redirects back once access
    /// is granted, and completion is observed by a later
    /// [`check_permissions`](CalendarBackend::check_permissions) call. This
    /// crate never follows the redirect itself.
    pub fn request_permissions_url(&self) -> Result<Url> {
        self.config.endpoint("calendar/request-permissions")
    }

    fn tasks_url(&self) -> Result<Url> {
        self.config.endpoint("tasks")
    }

    fn task_url(&self, id: TaskId) -> Result<Url> {
        self.config.endpoint(&format!("tasks/{}", id))
    }

    fn reminder_url(&self, id: TaskId) -> Result<Url> {
        self.config.endpoint(&format!("calendar/sync-task/{}", id))
    }

    /// Read the body of a successful response as `T`
    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// The error body the backend sends along 4xx answers
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Map a non-success status from a task endpoint to the error taxonomy
fn error_for_status(status: StatusCode, server_message: Option<String>) -> Error {
    match status.as_u16() {
        401 => Error::AuthRequired,
        400 => Error::BadRequest(server_message.unwrap_or_else(|| "no details provided".to_string())),
        409 | 412 => Error::Conflict,
        raw if status.is_server_error() => Error::Server { status: raw },
        raw => Error::UnexpectedStatus { status: raw },
    }
}

/// Map a non-success status from a calendar endpoint.
///
/// 404 and 400 mean the backend does not implement calendar synchronization,
/// which is a supported (if diminished) configuration, not a hard failure.
fn calendar_error_for_status(status: StatusCode) -> Error {
    match status.as_u16() {
        401 => Error::AuthRequired,
        400 | 404 => Error::CalendarUnavailable,
        raw if status.is_server_error() => Error::Server { status: raw },
        raw => Error::UnexpectedStatus { status: raw },
    }
}

/// Turn a failed task-endpoint response into an error, salvaging the
/// server-provided message when the body carries one
async fn task_error(response: Response) -> Error {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error.or(body.message));
    error_for_status(status, message)
}

#[async_trait]
impl TaskBackend for Client {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let url = self.tasks_url()?;
        log::debug!("Fetching the task list from {}", url);
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(task_error(response).await);
        }
        Self::decode(response).await
    }

    async fn create_task(&mut self, draft: &TaskDraft) -> Result<Task> {
        let response = self.http.post(self.tasks_url()?).json(draft).send().await?;
        if !response.status().is_success() {
            return Err(task_error(response).await);
        }
        Self::decode(response).await
    }

    async fn update_task(&mut self, id: TaskId, version: &VersionTag, edit: &TaskDraft) -> Result<Task> {
        let response = self
            .http
            .put(self.task_url(id)?)
            .header(IF_MATCH, version.as_str())
            .json(edit)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(task_error(response).await);
        }
        Self::decode(response).await
    }

    async fn patch_status(&mut self, id: TaskId, version: &VersionTag, status: Status) -> Result<Task> {
        let response = self
            .http
            .patch(self.task_url(id)?)
            .header(IF_MATCH, version.as_str())
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(task_error(response).await);
        }
        Self::decode(response).await
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        let response = self.http.delete(self.task_url(id)?).send().await?;
        if !response.status().is_success() {
            return Err(task_error(response).await);
        }
        Ok(())
    }
}

/// The body of `GET /calendar/permissions`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionsBody {
    has_permissions: bool,
}

#[async_trait]
impl CalendarBackend for Client {
    async fn sync_reminder(&mut self, id: TaskId, payload: &EventPayload) -> Result<EventRef> {
        let url = self.reminder_url(id)?;
        log::debug!("Upserting the calendar reminder of task {} at {}", id, url);
        let response = self.http.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(calendar_error_for_status(response.status()));
        }
        Self::decode(response).await
    }

    async fn delete_reminder(&mut self, id: TaskId) -> Result<()> {
        let response = self.http.delete(self.reminder_url(id)?).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match calendar_error_for_status(status) {
            // Deleting a reminder on a server without the feature deletes nothing
            Error::CalendarUnavailable => {
                log::debug!("No calendar support on this server, nothing to delete for task {}", id);
                Ok(())
            }
            err => Err(err),
        }
    }

    async fn check_permissions(&self) -> Result<bool> {
        let response = self.http.get(self.config.endpoint("calendar/permissions")?).send().await?;
        let status = response.status();
        if status.is_success() {
            let body: PermissionsBody = Self::decode(response).await?;
            return Ok(body.has_permissions);
        }
        match calendar_error_for_status(status) {
            Error::CalendarUnavailable => Ok(false),
            err => Err(err),
        }
    }
}
