use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use relaybot::core::rate_limiter::DEFAULT_WINDOW;
use relaybot::infrastructure::logger::{self, LogConfig};
use relaybot::{
    AppConfig, Bot, CompletionClient, MessageOrchestrator, OpenAIClient, RateLimiter,
    TelegramClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env is fine, the environment may already be populated
    let _ = dotenv::dotenv();

    let cfg = AppConfig::parse();

    logger::init(LogConfig {
        format: cfg.log_format,
        file: cfg.log_file_path(),
        ..Default::default()
    })?;

    cfg.validate()?;
    info!(config = %cfg.summary(), "starting bot");

    let result = run(cfg).await;
    if let Err(e) = &result {
        error!(severity = "critical", error = %format!("{:#}", e), "bot crashed");
    }
    info!("bot finished");
    result
}

async fn run(cfg: AppConfig) -> Result<()> {
    let telegram = Arc::new(TelegramClient::new(
        cfg.telegram_api_base.clone(),
        cfg.telegram_bot_token.clone(),
        cfg.poll_timeout(),
    )?);

    let username = telegram
        .get_me()
        .await
        .context("Telegram rejected the bot token")?;
    info!(bot = %username, "connected to Telegram");

    let llm = OpenAIClient::new_with_base_url(
        cfg.openrouter_api_key.clone(),
        cfg.model.clone(),
        cfg.openrouter_api_base.clone(),
        cfg.request_timeout(),
    )?;
    let completion = CompletionClient::new(Arc::new(llm), cfg.request_timeout());

    let limiter = Arc::new(RateLimiter::new(cfg.rate_limit, DEFAULT_WINDOW));
    let orchestrator = Arc::new(MessageOrchestrator::new(
        telegram.clone(),
        completion,
        limiter,
    ));

    Bot::new(telegram, orchestrator, cfg.poll_timeout())
        .run()
        .await;

    Ok(())
}
