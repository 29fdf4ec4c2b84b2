use crate::api_types::{ChatCompletionRequest, ChatCompletionResponse, Completion, Message};
use crate::error::GenerationError;
use crate::llm::{CompletionParams, LlmClient};
use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use reqwest::Client;
use serene_core::config::LlmConfig;
use std::time::Duration;

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .context("Failed to build HTTP client")?,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            retry: RetryConfig::with_attempts(config.retry_attempts),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    #[tracing::instrument(skip(self, system, messages, params), fields(model = %self.model))]
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<Completion> {
        // System prompt goes first as a role-tagged message.
        let mut openai_messages = Vec::with_capacity(messages.len() + 1);
        if !system.is_empty() {
            openai_messages.push(Message::system(system));
        }
        openai_messages.extend(messages);

        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: openai_messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
        };

        tracing::debug!(
            "LLM params: max_tokens={}, temperature={:.2}, top_p={:.2}",
            params.max_tokens,
            params.temperature,
            params.top_p
        );

        let url = format!("{}/chat/completions", self.base_url);
        let client = &self.client;
        let api_key = self.api_key.as_deref();

        let response = with_retry(&self.retry, "OpenAI", || async {
            let mut request = client.post(&url).json(&payload);
            if let Some(key) = api_key {
                request = request.bearer_auth(key);
            }
            let resp = request
                .send()
                .await
                .context("Failed to send request to OpenAI")?;
            Ok(resp)
        })
        .await?;

        let resp_text = response.text().await.context("Failed to read OpenAI response")?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&resp_text).context("Malformed OpenAI response")?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyChoices)?;

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            stop_reason: choice.finish_reason,
        })
    }
}
