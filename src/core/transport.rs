//! Chat transport interface
//!
//! Both halves of the chat platform as the bot sees them: outbound calls used
//! by the orchestrator and the update feed used by the polling loop.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ChatId, IncomingMessage, MessageId, ParseMode, SentMessage};
use crate::errors::Result;

/// The outbound half of the chat platform
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `text` to `chat_id`, returning a handle to the sent message
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<SentMessage>;

    /// Delete a message previously sent by the bot
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()>;
}

/// One polled update; `message` is `None` for anything that is not a text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolledUpdate {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

/// The inbound half of the chat platform
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Wait up to `timeout` for updates with id ≥ `offset`
    async fn poll(&self, offset: i64, timeout: Duration) -> Result<Vec<PolledUpdate>>;
}
