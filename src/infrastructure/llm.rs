//! LLM client
//!
//! OpenAI-compatible chat completions through async-openai. Pointed at
//! OpenRouter by default, any compatible base URL works.

use std::time::Duration;

use anyhow::{Context, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::core::completion::CompletionBackend;

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIClient {
    /// Create a client whose HTTP layer gives up after `request_timeout`
    pub fn new_with_base_url(
        api_key: String,
        model: String,
        base_url: String,
        request_timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build LLM HTTP client")?;

        let client = Client::with_config(config)
            .with_http_client(http)
            .with_backoff(single_attempt());

        Ok(Self { client, model })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Backoff policy that gives up after the first attempt.
///
/// async-openai retries 429 and 5xx responses by default; a provider error
/// must surface as a failure on the first answer.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

#[async_trait]
impl CompletionBackend for OpenAIClient {
    async fn complete(&self, text: &str) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .map(ChatCompletionRequestMessage::User)
            .context("failed to build user message")?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message])
            .build()
            .context("failed to build completion request")?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .context("LLM API call failed")?;

        response
            .choices
            .into_iter()
            .next()
            .context("LLM response has no choices")?
            .message
            .content
            .context("LLM response choice has no content")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAIClient::new_with_base_url(
            "sk-or-test".to_string(),
            "mistralai/mistral-small-3.2-24b-instruct:free".to_string(),
            "https://openrouter.ai/api/v1/".to_string(),
            Duration::from_secs(30),
        )
        .unwrap();

        assert_eq!(client.model(), "mistralai/mistral-small-3.2-24b-instruct:free");
    }

    #[test]
    fn test_single_attempt_policy_never_schedules_a_retry() {
        use backoff::backoff::Backoff;

        let mut policy = single_attempt();
        assert_eq!(policy.next_backoff(), None);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let client = OpenAIClient::new_with_base_url(
            "sk-or-test".to_string(),
            "test-model".to_string(),
            "http://127.0.0.1:9".to_string(),
            Duration::from_secs(2),
        )
        .unwrap();

        assert!(client.complete("hello").await.is_err());
    }
}
