//! Configuration
//!
//! Every option can be given as a flag or through the environment (a `.env`
//! file is loaded by the binary before parsing).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::errors::{RelayError, Result};
use crate::infrastructure::logger::{LogFormat, Sanitizer};

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Telegram bot relaying messages to a hosted LLM"
)]
pub struct AppConfig {
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: String,

    /// Telegram Bot API root
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = "https://api.telegram.org")]
    pub telegram_api_base: String,

    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: String,

    /// OpenAI-compatible API root
    #[arg(long, env = "OPENROUTER_API_BASE", default_value = "https://openrouter.ai/api/v1")]
    pub openrouter_api_base: String,

    #[arg(
        long,
        env = "LLM_MODEL",
        default_value = "mistralai/mistral-small-3.2-24b-instruct:free"
    )]
    pub model: String,

    /// Wait budget for one completion, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Requests allowed per user per minute
    #[arg(long, env = "RATE_LIMIT_PER_MINUTE", default_value_t = 3)]
    pub rate_limit: usize,

    /// Long polling timeout for getUpdates, in seconds
    #[arg(long, env = "POLL_TIMEOUT_SECS", default_value_t = 30)]
    pub poll_timeout_secs: u64,

    /// Console log format: pretty, compact, json
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Append-only log file; empty disables it
    #[arg(long, env = "LOG_FILE", default_value = "bot.log")]
    pub log_file: String,
}

impl AppConfig {
    /// Reject values the bot cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.telegram_bot_token.trim().is_empty() {
            return Err(RelayError::ConfigError("TELEGRAM_BOT_TOKEN is required".to_string()));
        }
        if self.openrouter_api_key.trim().is_empty() {
            return Err(RelayError::ConfigError("OPENROUTER_API_KEY is required".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(RelayError::ConfigError(
                "REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.rate_limit == 0 {
            return Err(RelayError::ConfigError(
                "RATE_LIMIT_PER_MINUTE must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        let path = self.log_file.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    /// One-line summary with secrets masked
    pub fn summary(&self) -> String {
        format!(
            "model={} api_base={} api_key={} bot_token={} timeout={}s rate_limit={}/min",
            self.model,
            self.openrouter_api_base,
            Sanitizer::api_key(&self.openrouter_api_key),
            Sanitizer::token(&self.telegram_bot_token),
            self.request_timeout_secs,
            self.rate_limit,
        )
    }
}
