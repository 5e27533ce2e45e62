use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between a controller and the backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// An authenticated call was attempted without a stored token.
    /// Raised before any request is sent.
    #[error("authentication token not found, please log in")]
    AuthRequired,

    /// The stored roles do not include what the command needs. Display
    /// gating only; the backend makes the real decision.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// No response was received (connect failure, timeout, broken body).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A local required-field check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// A 2xx body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A 2xx body parsed but is missing data the caller cannot do without.
    #[error("invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("session storage error: {0}")]
    Storage(#[from] sled::Error),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// HTTP status of an `Api` error, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
