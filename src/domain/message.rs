//! Inbound message entities
//!
//! Every inbound event is stateless: it carries the chat it came from, the
//! sender and the raw text, nothing more.

use serde::{Deserialize, Serialize};

use super::command::Command;

/// Platform user identifier
pub type UserId = i64;

/// Platform chat identifier
pub type ChatId = i64;

/// Platform message identifier, unique within a chat
pub type MessageId = i64;

/// A text message received from a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub message_id: MessageId,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(chat_id: ChatId, user_id: UserId, message_id: MessageId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            user_id,
            message_id,
            text: text.into(),
        }
    }

    /// First `max_chars` characters of the text, for log lines
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }
}

/// Reference to a message the bot itself sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Text formatting mode for outbound messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// How an inbound message is routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// One of the fixed side-channel commands
    Command(Command, IncomingMessage),
    /// Anything else goes to the model, including unknown `/commands`
    Text(IncomingMessage),
}

impl Inbound {
    pub fn classify(message: IncomingMessage) -> Self {
        match Command::parse(&message.text) {
            Some(cmd) => Inbound::Command(cmd, message),
            None => Inbound::Text(message),
        }
    }
}
