//! Telegram Bot API client
//!
//! Plain HTTPS + JSON over reqwest: long polling for updates, send and
//! delete for replies.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::transport::{ChatTransport, PolledUpdate, UpdateSource};
use crate::domain::{ChatId, IncomingMessage, MessageId, ParseMode, SentMessage};
use crate::errors::{RelayError, Result};

/// Slack added to the HTTP timeout on top of the long polling timeout
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TelegramClient {
    api_base: String,
    token: String,
    http: reqwest::Client,
}

/// Every Bot API response is wrapped in this envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(RelayError::TransportError(format!(
                "{}: ok response without result",
                method
            ))),
            (false, _) => Err(RelayError::TransportError(format!(
                "{} failed ({}): {}",
                method,
                self.error_code.unwrap_or_default(),
                self.description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: MessageId,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: ChatId,
}

impl Update {
    /// The update as an inbound text message, if it is one
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message = self.message?;
        let user = message.from?;
        let text = message.text?;
        Some(IncomingMessage::new(message.chat.id, user.id, message.message_id, text))
    }
}

impl From<Update> for PolledUpdate {
    fn from(update: Update) -> Self {
        PolledUpdate {
            update_id: update.update_id,
            message: update.into_incoming(),
        }
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
}

#[derive(Serialize)]
struct DeleteMessageRequest {
    chat_id: ChatId,
    message_id: MessageId,
}

#[derive(Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

impl TelegramClient {
    /// `poll_timeout` sizes the HTTP timeout so long polls are not cut short
    pub fn new(api_base: String, token: String, poll_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(poll_timeout + POLL_GRACE)
            .build()?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // Bot API reports failures in the body, also on 4xx, so no error_for_status here
        let response: ApiResponse<T> = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| RelayError::NetworkError(format!("{}: {}", method, e.without_url())))?
            .json()
            .await
            .map_err(|e| RelayError::TransportError(format!("{}: bad response: {}", method, e.without_url())))?;

        response.into_result(method)
    }

    /// Verify the token; returns the bot's username
    pub async fn get_me(&self) -> Result<String> {
        let me: TgUser = self.call("getMe", &serde_json::json!({})).await?;
        Ok(me.username.unwrap_or_else(|| me.id.to_string()))
    }

    /// Long poll for updates with id ≥ `offset`
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: &["message"],
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;
        debug!(count = updates.len(), offset, "polled updates");
        Ok(updates)
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<SentMessage> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
        };
        let sent: TgMessage = self.call("sendMessage", &request).await?;
        Ok(SentMessage {
            chat_id: sent.chat.id,
            message_id: sent.message_id,
        })
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
        let request = DeleteMessageRequest {
            chat_id,
            message_id,
        };
        let _deleted: bool = self.call("deleteMessage", &request).await?;
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn poll(&self, offset: i64, timeout: Duration) -> Result<Vec<PolledUpdate>> {
        let updates = self.get_updates(offset, timeout).await?;
        Ok(updates.into_iter().map(PolledUpdate::from).collect())
    }
}
