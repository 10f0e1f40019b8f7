//! Completion client
//!
//! `CompletionBackend` is the seam to the hosted model; `CompletionClient`
//! wraps one backend call in an outer wait budget and folds every fault into
//! `CompletionError`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, warn};

use crate::domain::UserId;
use crate::errors::CompletionError;
use crate::infrastructure::logger::Timer;

/// Default wait budget for one completion
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A model that answers one single-turn prompt
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send `text` as the only user message and return the first choice's content
    async fn complete(&self, text: &str) -> Result<String>;
}

/// Bounded, non-retrying completion call
#[derive(Clone)]
pub struct CompletionClient {
    backend: Arc<dyn CompletionBackend>,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn CompletionBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one completion for `user_id`.
    ///
    /// The outer budget applies regardless of any timeout the backend
    /// enforces itself. Causes are logged here and never leave as text.
    pub async fn complete(&self, user_id: UserId, text: &str) -> Result<String, CompletionError> {
        let _timer = Timer::new("completion");

        match tokio::time::timeout(self.timeout, self.backend.complete(text)).await {
            // the chat platform refuses to send empty text
            Ok(Ok(reply)) if reply.trim().is_empty() => {
                error!(user_id, "completion returned empty content");
                Err(CompletionError::Failure("empty completion content".to_string()))
            }
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => {
                error!(user_id, error = %format!("{:#}", e), "completion failed");
                Err(CompletionError::Failure(format!("{:#}", e)))
            }
            Err(_) => {
                warn!(user_id, timeout_secs = self.timeout.as_secs(), "completion timed out");
                Err(CompletionError::Timeout(self.timeout))
            }
        }
    }
}
