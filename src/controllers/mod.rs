//! View controllers: read user input, validate required fields, call the
//! catalog service and hand back a status line plus whatever should be shown.
//!
//! Controllers never return errors. Every failure is caught here and turned
//! into an error [`StatusMessage`]; the user can always retry.

pub mod admin;
pub mod auth;
pub mod comparison;
pub mod prices;
pub mod reviews;
pub mod storefront;

use std::fmt;

use tracing::warn;

use crate::catalog::CatalogService;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// Transient one-line feedback for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Info, text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            StatusKind::Success => "ok",
            StatusKind::Error => "error",
            StatusKind::Info => "info",
        };
        write!(f, "[{tag}] {}", self.text)
    }
}

/// Result of a controller action: always a status, data only on success.
#[derive(Debug)]
pub struct Outcome<T> {
    pub status: StatusMessage,
    pub data: Option<T>,
    /// Underlying failure, kept for callers that branch on its kind.
    pub error: Option<ClientError>,
}

impl<T> Outcome<T> {
    pub fn done(data: T, status: StatusMessage) -> Self {
        Self { status, data: Some(data), error: None }
    }

    /// Error outcome showing the error's own message.
    pub fn failed(err: ClientError) -> Self {
        let text = err.to_string();
        Self::failed_with(err, text)
    }

    /// Error outcome with a fixed user-facing text; the cause is logged.
    pub fn failed_with(err: ClientError, text: impl Into<String>) -> Self {
        let text = text.into();
        warn!("{text}: {err}");
        Self { status: StatusMessage::error(text), data: None, error: Some(err) }
    }

    pub fn from_result(result: Result<T>, success: impl FnOnce(&T) -> StatusMessage) -> Self {
        match result {
            Ok(data) => {
                let status = success(&data);
                Self::done(data, status)
            }
            Err(e) => Self::failed(e),
        }
    }

    pub fn is_ok(&self) -> bool {
        !self.status.is_error()
    }
}

/// Everything a controller needs: catalog access, session and settings.
#[derive(Clone)]
pub struct AppContext {
    pub catalog: CatalogService,
    pub session: SessionStore,
    pub config: Config,
}

impl AppContext {
    pub fn new(config: Config, session: SessionStore) -> Result<Self> {
        let client = ApiClient::new(&config, session.clone())?;
        Ok(Self {
            catalog: CatalogService::new(client),
            session,
            config,
        })
    }

    /// Open the sled session at `config.session_path` and build the context.
    ///
    /// When the session cannot be opened (typically another process holds
    /// its lock) the context runs logged out on a volatile session, so public
    /// commands still work. A login made in that state is not persisted.
    pub fn open(config: Config) -> Result<Self> {
        let session = SessionStore::open(&config.session_path).unwrap_or_else(|e| {
            warn!(
                path = %config.session_path,
                "Session unavailable, continuing logged out; a login now will not be saved: {e}"
            );
            SessionStore::in_memory()
        });
        Self::new(config, session)
    }
}

pub(crate) fn require(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ClientError::validation(message))
    } else {
        Ok(trimmed.to_string())
    }
}
