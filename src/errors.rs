//! Error types
//!
//! `RelayError` covers everything that can abort handling of one inbound
//! message; `CompletionError` is the narrow outcome of a single LLM call.

use std::time::Duration;

use thiserror::Error;

/// Crate-level error type
#[derive(Error, Debug)]
pub enum RelayError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The chat platform rejected a call (`ok: false` in the envelope)
    #[error("Transport error: {0}")]
    TransportError(String),

    /// HTTP-level failure talking to the chat platform
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Completion call failed
    #[error("Completion error: {0}")]
    CompletionError(#[from] CompletionError),

    /// Anything else, including a panic caught at the message boundary
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Outcome of a failed completion call.
///
/// Only the variant is ever shown to a user (as canned text); the payload is
/// for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The outer wait budget expired before the backend answered
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP error, provider-side rate limit, auth failure, malformed response...
    #[error("completion failed: {0}")]
    Failure(String),
}

impl From<anyhow::Error> for RelayError {
    fn from(err: anyhow::Error) -> Self {
        RelayError::Unknown(format!("{:#}", err))
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::TransportError(err.to_string())
    }
}

/// Crate result alias
pub type Result<T> = std::result::Result<T, RelayError>;
