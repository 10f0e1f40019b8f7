//! Telegram ↔ LLM relay
//!
//! Receives user text messages, forwards each one as a single-turn prompt to
//! an OpenAI-compatible completion API and sends the reply back, with a
//! per-user sliding window rate limit in front.
//!
//! # Layers
//!
//! - `domain`: message and command entities
//! - `core`: rate limiter, completion client, transport traits, config
//! - `infrastructure`: async-openai backend, Telegram client, logging
//! - `application`: message orchestration and the polling loop

pub mod application;
pub mod core;
pub mod domain;
pub mod errors;
pub mod infrastructure;

pub use crate::application::bot::Bot;
pub use crate::application::orchestrator::{MessageOrchestrator, Outcome};
pub use crate::core::completion::{CompletionBackend, CompletionClient};
pub use crate::core::config::AppConfig;
pub use crate::core::rate_limiter::{Clock, ManualClock, RateLimiter, SystemClock};
pub use crate::core::transport::{ChatTransport, PolledUpdate, UpdateSource};
pub use crate::domain::{Command, Inbound, IncomingMessage, ParseMode, SentMessage, UserId};
pub use crate::errors::{CompletionError, RelayError, Result};
pub use crate::infrastructure::llm::OpenAIClient;
pub use crate::infrastructure::telegram::TelegramClient;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
