//! Logging: structured output, per-message tracing context, latency timers
//!
//! Console output goes to stdout in the configured format. When a log file is
//! set, every event is also appended to it as plain text.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::domain::UserId;

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Multi-line, human readable
    Pretty,
    /// Single line
    Compact,
    /// One JSON object per line
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Append-only plain text copy of the log
    pub file: Option<PathBuf>,
    pub show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            file: None,
            show_target: true,
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(config.show_target),
            )
        }
        None => None,
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(config.show_target))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(config.show_target))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(config.show_target)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
    };

    installed.context("failed to install tracing subscriber")
}

/// Tracing context for one inbound message
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub user_id: UserId,
    pub start_time: Instant,
}

impl RequestContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            user_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Span that every log line of this message is recorded under
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "message",
            request_id = %self.request_id,
            user_id = self.user_id,
        )
    }
}

/// Logs the elapsed time of an operation on drop
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            target: "metrics",
            operation = %self.name,
            elapsed_ms = %format!("{:.2}", elapsed_ms),
            "operation completed"
        );
    }
}

/// Masks secrets before they reach a log line
pub struct Sanitizer;

impl Sanitizer {
    /// Keep the first 8 and last 4 characters of a long key
    pub fn api_key(key: &str) -> String {
        let chars: Vec<char> = key.chars().collect();
        if chars.len() <= 16 {
            return "***".to_string();
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }

    /// Bot tokens grant full control of the bot; hide them entirely
    pub fn token(_token: &str) -> String {
        "***TOKEN***".to_string()
    }
}
