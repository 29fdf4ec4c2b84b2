//! Mock LLM provider: deterministic responses for running without API keys.

use crate::api_types::{Completion, Message, Role};
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::INTENSITY_SYSTEM_PROMPT;
use anyhow::Result;

/// Score the mock hands back for every intensity request.
pub const MOCK_INTENSITY: &str = "5";

#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for MockProvider {
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        _params: CompletionParams,
    ) -> Result<Completion> {
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let text = if system == INTENSITY_SYSTEM_PROMPT {
            MOCK_INTENSITY.to_string()
        } else {
            let turns = messages.iter().filter(|m| m.role == Role::User).count();
            format!(
                "(Mock {} Response #{}) Thank you for sharing that with me. How are you feeling right now?",
                self.model, turns
            )
        };

        Ok(Completion {
            text,
            stop_reason: Some("stop".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_complete() {
        let provider = MockProvider::new("test-model");
        let resp = provider
            .complete("system", vec![Message::user("hi")], CompletionParams::default())
            .await
            .unwrap();
        assert!(resp.text.contains("Mock"));
        assert!(resp.text.contains("test-model"));
        assert!(resp.text.contains("#1"));
    }

    #[tokio::test]
    async fn test_mock_intensity() {
        let provider = MockProvider::new("test-model");
        let resp = provider
            .complete(
                INTENSITY_SYSTEM_PROMPT,
                vec![Message::user("rate this")],
                CompletionParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(resp.text, MOCK_INTENSITY);
    }
}
