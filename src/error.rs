//! Error types for Scratch API operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during Scratch API operations.
#[derive(Debug, Error)]
pub enum ScratchError {
    /// Configuration is missing or incomplete.
    #[error("Scratch configuration required: {0}")]
    ConfigMissing(String),

    /// The remote service answered with an application-level error body.
    #[error("Scratch API error {code}: {message}")]
    Remote { code: String, message: String },

    /// A caller-supplied argument was rejected before any request was sent.
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// The remote API no longer offers this operation.
    #[error("Operation no longer supported: {0}")]
    Unsupported(&'static str),

    /// Login failed or the operation needs an authenticated session.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The server returned a non-success status without an error body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response decoded but lacked the data the operation needs.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Writing a downloaded body failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller's deadline elapsed before the operation finished.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Coarse classification of a [`ScratchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be completed or its body could not be decoded.
    Transport,
    /// The service answered with an in-body error code.
    Remote,
    /// A local argument check failed.
    Validation,
    /// The operation was removed from the remote API.
    Unsupported,
    /// Session or credential failure.
    Auth,
}

impl ScratchError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Remote { .. } => ErrorKind::Remote,
            Self::Validation(_) | Self::ConfigMissing(_) => ErrorKind::Validation,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Status { .. }
            | Self::UnexpectedResponse(_)
            | Self::HttpError(_)
            | Self::ParseError(_)
            | Self::UrlError(_)
            | Self::Io(_)
            | Self::Timeout(_) => ErrorKind::Transport,
        }
    }

    /// Whether the service reported that the entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { code, .. } if code == "NotFound")
    }
}

/// Result type alias for Scratch operations.
pub type Result<T> = core::result::Result<T, ScratchError>;
