//! HTTP client for the wellness persistence API.
//!
//! Each call is a single request: no retries here. Callers decide what a
//! failure means (for the conversation logger, nothing beyond a warning).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serene_core::config::ApiConfig;
use serene_core::{ApiError, ChatLogEntry, ExerciseLogEntry, HistoryRecord, MoodLogEntry, WellnessApi};
use std::time::Duration;
use url::Url;

const CHAT_LOGS: &str = "chat-logs";
const MOOD_LOGS: &str = "mood-logs";
const EXERCISE_LOGS: &str = "exercise-logs";

/// History responses come either as a bare list or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryPayload {
    List(Vec<HistoryRecord>),
    Wrapped { data: Vec<HistoryRecord> },
}

impl HistoryPayload {
    fn into_records(self) -> Vec<HistoryRecord> {
        match self {
            HistoryPayload::List(records) | HistoryPayload::Wrapped { data: records } => records,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpWellnessApi {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpWellnessApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid API base URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot be a base: {}", config.base_url);
        }

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .context("Failed to build HTTP client")?,
            base_url,
            auth_token: config.auth_token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API base URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post_json<T: serde::Serialize + Sync>(&self, resource: &str, body: &T) -> Result<()> {
        let url = self.endpoint(&[resource])?;
        tracing::debug!("POST {}", url);
        let response = self
            .authorize(self.client.post(url).json(body))
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: body.chars().take(300).collect(),
    })
}

#[async_trait]
impl WellnessApi for HttpWellnessApi {
    async fn log_chat(&self, entry: &ChatLogEntry) -> Result<()> {
        self.post_json(CHAT_LOGS, entry).await
    }

    async fn log_mood(&self, entry: &MoodLogEntry) -> Result<()> {
        self.post_json(MOOD_LOGS, entry).await
    }

    async fn log_exercise(&self, entry: &ExerciseLogEntry) -> Result<()> {
        self.post_json(EXERCISE_LOGS, entry).await
    }

    async fn chat_history(&self, user_id: &str) -> Result<Vec<HistoryRecord>> {
        let url = self.endpoint(&[CHAT_LOGS, user_id])?;
        tracing::debug!("GET {}", url);
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let response = check_status(response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let payload: HistoryPayload =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(payload.into_records())
    }
}
