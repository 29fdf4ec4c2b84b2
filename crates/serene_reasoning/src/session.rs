//! Chat session controller: owns the transcript and drives one user turn at a time.
//!
//! Per turn the user message is appended first, its side effects (chat log,
//! mood and activity logging) are spawned in the background, and only then
//! is the reply requested. The reply never waits on logging.

use crate::api_types::Message;
use crate::error::ChatError;
use crate::intensity::IntensityEstimator;
use crate::llm::{CompletionParams, LlmClient};
use crate::logger::ConversationLogger;
use chrono::Utc;
use serene_core::config::{DEFAULT_SYSTEM_PROMPT, SereneConfig};
use serene_core::{
    detect_activity, detect_mood, ActivityDetection, ChatMessage, MoodLabel, WellnessApi,
};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not opened yet, or closed.
    Idle,
    /// Open and ready for the next user message.
    AwaitingInput,
    /// User message accepted, side effects being dispatched.
    ProcessingTurn,
    /// Waiting on the text-generation endpoint.
    AwaitingReply,
}

/// What a completed turn produced for the front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub reply: ChatMessage,
    pub mood: Option<MoodLabel>,
    pub activity: Option<ActivityDetection>,
}

pub struct ChatSession {
    user_id: String,
    system_prompt: String,
    client: Arc<dyn LlmClient>,
    api: Arc<dyn WellnessApi>,
    logger: ConversationLogger,
    params: CompletionParams,
    transcript: Vec<ChatMessage>,
    state: watch::Sender<SessionState>,
}

impl ChatSession {
    /// `client` serves both replies and intensity scoring.
    pub fn new(user_id: impl Into<String>, client: Arc<dyn LlmClient>, api: Arc<dyn WellnessApi>) -> Self {
        let config = SereneConfig::default();
        Self::with_params(
            user_id,
            client,
            api,
            CompletionParams::from(&config.llm),
            CompletionParams::from(&config.intensity),
        )
    }

    pub fn from_config(config: &SereneConfig, client: Arc<dyn LlmClient>, api: Arc<dyn WellnessApi>) -> Self {
        Self::with_params(
            config.session.user_id.clone(),
            client,
            api,
            CompletionParams::from(&config.llm),
            CompletionParams::from(&config.intensity),
        )
        .with_system_prompt(config.session.system_prompt.clone())
    }

    fn with_params(
        user_id: impl Into<String>,
        client: Arc<dyn LlmClient>,
        api: Arc<dyn WellnessApi>,
        reply_params: CompletionParams,
        intensity_params: CompletionParams,
    ) -> Self {
        let user_id = user_id.into();
        let estimator = IntensityEstimator::new(client.clone(), intensity_params);
        let logger = ConversationLogger::new(user_id.clone(), api.clone(), estimator);
        Self {
            user_id,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            client,
            api,
            logger,
            params: reply_params,
            transcript: Vec::new(),
            state: watch::channel(SessionState::Idle).0,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Follow state changes from another task while a turn is running.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn logger(&self) -> &ConversationLogger {
        &self.logger
    }

    /// Open the session, optionally seeding the transcript from stored history.
    ///
    /// History failures are logged and the session opens empty.
    pub async fn open(&mut self, seed_history: bool) {
        if seed_history && self.transcript.is_empty() {
            match self.api.chat_history(&self.user_id).await {
                Ok(records) => {
                    let now = Utc::now();
                    self.transcript
                        .extend(records.into_iter().map(|r| r.into_chat_message(now)));
                    tracing::info!("Seeded transcript with {} messages", self.transcript.len());
                }
                Err(e) => {
                    tracing::warn!("Failed to load chat history, starting empty: {:#}", e);
                }
            }
        }
        self.set_state(SessionState::AwaitingInput);
    }

    /// Run one user turn and return the bot reply.
    ///
    /// The text is stored and logged as given; only blank input is rejected.
    /// On reply failure the user message stays in the transcript and no bot
    /// message is appended.
    pub async fn send(&mut self, text: &str) -> Result<TurnOutcome, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.set_state(SessionState::ProcessingTurn);

        let mut messages: Vec<Message> = self.transcript.iter().map(Message::from).collect();
        messages.push(Message::user(text));

        let user_message = ChatMessage::user(text);
        let detected_at = user_message.timestamp;
        self.logger.log_chat(&user_message);
        self.transcript.push(user_message);

        let mood = detect_mood(text);
        let activity = detect_activity(text);
        tracing::debug!("Turn signals: mood={:?}, activity={:?}", mood, activity);
        self.logger
            .log_signals(text, detected_at, mood, activity.clone());

        self.set_state(SessionState::AwaitingReply);
        let result = self
            .client
            .complete(&self.system_prompt, messages, self.params.clone())
            .await;
        self.set_state(SessionState::AwaitingInput);

        let completion = result.map_err(|e| {
            tracing::error!("Reply generation failed: {:#}", e);
            ChatError::Generation(e)
        })?;

        let reply_text = completion.text.trim();
        if reply_text.is_empty() {
            return Err(ChatError::EmptyReply);
        }

        let reply = ChatMessage::bot(reply_text);
        self.logger.log_chat(&reply);
        self.transcript.push(reply.clone());

        Ok(TurnOutcome {
            reply,
            mood,
            activity,
        })
    }

    /// Close the session, giving outstanding log calls a chance to finish.
    pub async fn close(&mut self) {
        self.logger.flush().await;
        self.set_state(SessionState::Idle);
    }
}
