//! Support for library configuration options

use once_cell::sync::Lazy;
use url::Url;

use crate::error::{Error, Result};

/// Environment variable overriding the default backend base URL
pub const BASE_URL_VAR: &str = "CORKBOARD_URL";
/// Environment variable providing the session cookie, as `name=value`
pub const SESSION_COOKIE_VAR: &str = "CORKBOARD_SESSION";

/// Where the backend lives when nothing else is configured
static DEFAULT_BASE_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://localhost:3000/api/").unwrap(/* this cannot panic, the literal is a valid URL */)
});

/// Everything the [`Client`](crate::client::Client) needs to know to reach the backend.
///
/// There is exactly one of these per client, built once at startup and injected
/// into [`Client::new`](crate::client::Client::new). Authentication state lives
/// here and nowhere else.
#[derive(Clone, Debug)]
pub struct Config {
    base_url: Url,
    session_cookie: Option<String>,
}

impl Config {
    /// Create a configuration pointing at the given base URL.
    ///
    /// A trailing slash is appended if missing, so that endpoint paths can be
    /// joined onto it.
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self> {
        let mut raw = base_url.as_ref().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)
            .map_err(|err| Error::Config(format!("invalid base URL {:?}: {}", base_url.as_ref(), err)))?;
        Ok(Self { base_url, session_cookie: None })
    }

    /// Attach the session cookie (`name=value`) that authenticates every call
    pub fn with_session_cookie<S: ToString>(mut self, cookie: S) -> Self {
        self.session_cookie = Some(cookie.to_string());
        self
    }

    /// Build a configuration from `CORKBOARD_URL` and `CORKBOARD_SESSION`,
    /// falling back to the built-in default URL.
    pub fn from_env() -> Result<Self> {
        let config = match std::env::var(BASE_URL_VAR) {
            Ok(url) => Self::new(url)?,
            Err(_) => Self::default(),
        };
        Ok(match std::env::var(SESSION_COOKIE_VAR) {
            Ok(cookie) => config.with_session_cookie(cookie),
            Err(_) => config,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session_cookie(&self) -> Option<&str> {
        self.session_cookie.as_deref()
    }

    /// Resolve a relative endpoint path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| Error::Config(format!("invalid endpoint path {:?}: {}", path, err)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.clone(),
            session_cookie: None,
        }
    }
}
