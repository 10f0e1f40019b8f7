//! Message orchestration
//!
//! One inbound text message runs through
//! `Received → RateChecked → Notified → Completing → Delivered | Errored`.
//! Nothing is kept between messages except the limiter's timestamps.
//!
//! `handle_message` is the failure boundary for one message: whatever goes
//! wrong inside, the user gets exactly one reply and the caller gets an
//! `Outcome`, never an error.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn, Instrument};

use crate::core::completion::CompletionClient;
use crate::core::rate_limiter::RateLimiter;
use crate::core::replies;
use crate::core::transport::ChatTransport;
use crate::domain::{Command, Inbound, IncomingMessage, ParseMode, SentMessage};
use crate::errors::{CompletionError, RelayError, Result};
use crate::infrastructure::logger::RequestContext;

/// Characters of user text copied into the "new request" log line
const LOG_PREVIEW_CHARS: usize = 50;

/// How handling of one message ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Over the limit; canned text sent, no completion call
    RateLimited,
    /// Model reply delivered
    Replied,
    /// Completion exceeded its budget; timeout text sent
    TimedOut,
    /// Completion failed; apology sent
    Failed,
    /// Something escaped the normal path; generic error text sent
    Unexpected,
    /// Fixed command text sent
    CommandAnswered,
}

pub struct MessageOrchestrator {
    transport: Arc<dyn ChatTransport>,
    completion: CompletionClient,
    limiter: Arc<RateLimiter>,
}

impl MessageOrchestrator {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        completion: CompletionClient,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            transport,
            completion,
            limiter,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Route a classified inbound message
    pub async fn handle(&self, inbound: Inbound) -> Outcome {
        match inbound {
            Inbound::Command(command, message) => self.handle_command(command, &message).await,
            Inbound::Text(message) => self.handle_message(&message).await,
        }
    }

    /// Answer `/start`, `/reset` or `/help`.
    ///
    /// Never touches the limiter or the completion client.
    pub async fn handle_command(&self, command: Command, message: &IncomingMessage) -> Outcome {
        let (text, parse_mode) = match command {
            Command::Start | Command::Reset => (replies::WELCOME.to_string(), None),
            Command::Help => (replies::help(self.limiter.threshold()), Some(ParseMode::Html)),
        };

        info!(user_id = message.user_id, command = %command, "command received");

        match self.transport.send_text(message.chat_id, &text, parse_mode).await {
            Ok(_) => Outcome::CommandAnswered,
            Err(e) => {
                error!(user_id = message.user_id, command = %command, error = %e, "failed to answer command");
                Outcome::Unexpected
            }
        }
    }

    /// Run the full flow for one text message
    pub async fn handle_message(&self, message: &IncomingMessage) -> Outcome {
        let ctx = RequestContext::new(message.user_id);

        async {
            let result = AssertUnwindSafe(self.process(message)).catch_unwind().await;

            let failure = match result {
                Ok(Ok(outcome)) => {
                    info!(outcome = ?outcome, elapsed_ms = ctx.elapsed().as_millis() as u64, "message handled");
                    return outcome;
                }
                Ok(Err(e)) => e,
                Err(panic) => RelayError::Unknown(panic_message(panic.as_ref())),
            };

            error!(severity = "critical", error = %failure, "unexpected error while handling message");

            if let Err(e) = self
                .transport
                .send_text(message.chat_id, replies::UNEXPECTED_ERROR, None)
                .await
            {
                error!(severity = "critical", error = %e, "failed to deliver error reply");
            }

            Outcome::Unexpected
        }
        .instrument(ctx.span())
        .await
    }

    async fn process(&self, message: &IncomingMessage) -> Result<Outcome> {
        let chat_id = message.chat_id;
        info!(text = %message.preview(LOG_PREVIEW_CHARS), "new request");

        if self.limiter.is_rate_limited(&message.user_id) {
            info!("request rejected by rate limiter");
            self.transport.send_text(chat_id, replies::RATE_LIMITED, None).await?;
            return Ok(Outcome::RateLimited);
        }

        let notice = self.transport.send_text(chat_id, replies::PROCESSING, None).await?;

        let completion = self.completion.complete(message.user_id, &message.text).await;

        self.remove_notice(notice).await;

        let (text, outcome) = match completion {
            Ok(reply) => (reply, Outcome::Replied),
            Err(CompletionError::Timeout(_)) => (replies::TIMEOUT.to_string(), Outcome::TimedOut),
            Err(CompletionError::Failure(_)) => {
                (replies::COMPLETION_FAILED.to_string(), Outcome::Failed)
            }
        };

        self.transport.send_text(chat_id, &text, None).await?;
        Ok(outcome)
    }

    /// Delete the processing notice; a failure here is logged and dropped
    async fn remove_notice(&self, notice: SentMessage) {
        if let Err(e) = self
            .transport
            .delete_message(notice.chat_id, notice.message_id)
            .await
        {
            warn!(message_id = notice.message_id, error = %e, "failed to delete processing notice");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic with unknown payload".to_string()
    }
}
