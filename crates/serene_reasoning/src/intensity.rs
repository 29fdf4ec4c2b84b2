//! Mood intensity estimation: a tiny LLM call that rates a detected mood 1-10.
//!
//! Never fails outward. Any problem (transport, parse, range) means "no
//! score", and no score means the mood is not logged.

use crate::api_types::Message;
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::{intensity_prompt, INTENSITY_SYSTEM_PROMPT};
use anyhow::{Context, Result};
use regex::Regex;
use serene_core::{IntensityScore, MoodLabel};
use std::sync::{Arc, LazyLock};

static RE_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

pub struct IntensityEstimator {
    client: Arc<dyn LlmClient>,
    params: CompletionParams,
}

impl IntensityEstimator {
    pub fn new(client: Arc<dyn LlmClient>, params: CompletionParams) -> Self {
        Self { client, params }
    }

    /// Ask the model how strongly `mood` shows in `message`.
    pub async fn predict_mood_score(&self, message: &str, mood: MoodLabel) -> Option<IntensityScore> {
        match self.predict_inner(message, mood).await {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!("Intensity estimation failed (non-fatal): {:#}", e);
                None
            }
        }
    }

    async fn predict_inner(&self, message: &str, mood: MoodLabel) -> Result<Option<IntensityScore>> {
        let messages = vec![Message::user(intensity_prompt(message, mood))];

        let response = self
            .client
            .complete(INTENSITY_SYSTEM_PROMPT, messages, self.params.clone())
            .await
            .context("Intensity LLM call failed")?;

        let score = parse_score(&response.text);
        if score.is_none() {
            tracing::debug!("Unusable intensity response: {:?}", response.text);
        }
        Ok(score)
    }
}

/// First integer in `text`, if it lies within 1..=10.
pub fn parse_score(text: &str) -> Option<IntensityScore> {
    let digits = RE_INTEGER.find(text)?;
    let value: i64 = digits.as_str().parse().ok()?;
    IntensityScore::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_types::Completion;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedClient {
        reply: Result<String, String>,
        seen: Mutex<Vec<(String, CompletionParams)>>,
    }

    impl FixedClient {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("upstream unavailable".to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for FixedClient {
        async fn complete(
            &self,
            system: &str,
            _messages: Vec<Message>,
            params: CompletionParams,
        ) -> Result<Completion> {
            self.seen.lock().unwrap().push((system.to_string(), params));
            match &self.reply {
                Ok(text) => Ok(Completion {
                    text: text.clone(),
                    stop_reason: None,
                }),
                Err(e) => Err(anyhow::anyhow!(e.clone())),
            }
        }
    }

    fn low_randomness() -> CompletionParams {
        CompletionParams {
            max_tokens: 5,
            temperature: 0.1,
            top_p: 1.0,
        }
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("7").map(|s| s.get()), Some(7));
        assert_eq!(parse_score(" Score: 10.").map(|s| s.get()), Some(10));
        assert_eq!(parse_score("3/10").map(|s| s.get()), Some(3));
        assert_eq!(parse_score("0"), None);
        assert_eq!(parse_score("11"), None);
        assert_eq!(parse_score("very intense"), None);
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("99999999999999999999999"), None);
    }

    #[tokio::test]
    async fn test_predict_valid_score() {
        let client = Arc::new(FixedClient::ok("8"));
        let estimator = IntensityEstimator::new(client.clone(), low_randomness());
        let score = estimator.predict_mood_score("I'm really stressed", MoodLabel::Stressed).await;
        assert_eq!(score.map(|s| s.get()), Some(8));

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, INTENSITY_SYSTEM_PROMPT);
        assert_eq!(seen[0].1.max_tokens, 5);
    }

    #[tokio::test]
    async fn test_predict_out_of_range_is_none() {
        let estimator = IntensityEstimator::new(Arc::new(FixedClient::ok("42")), low_randomness());
        assert!(estimator.predict_mood_score("so happy", MoodLabel::Happy).await.is_none());
    }

    #[tokio::test]
    async fn test_predict_failure_is_none() {
        let estimator = IntensityEstimator::new(Arc::new(FixedClient::failing()), low_randomness());
        assert!(estimator.predict_mood_score("so sad", MoodLabel::Sad).await.is_none());
    }
}
