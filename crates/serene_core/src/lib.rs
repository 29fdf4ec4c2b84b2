pub mod activity;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod model;
pub mod mood;

pub use activity::detect_activity;
pub use config::SereneConfig;
pub use error::ApiError;
pub use model::{
    ActivityDetection, ChatLogEntry, ChatMessage, ExerciseLogEntry, HistoryRecord,
    IntensityScore, MoodLabel, MoodLogEntry, Sender,
};
pub use mood::detect_mood;

use async_trait::async_trait;

/// Remote persistence for everything a conversation produces.
///
/// Implementations only move entries over the wire; deciding what to log
/// and when belongs to the conversation logger.
#[async_trait]
pub trait WellnessApi: Send + Sync {
    async fn log_chat(&self, entry: &ChatLogEntry) -> anyhow::Result<()>;
    async fn log_mood(&self, entry: &MoodLogEntry) -> anyhow::Result<()>;
    async fn log_exercise(&self, entry: &ExerciseLogEntry) -> anyhow::Result<()>;
    /// Ordered chat history for a user, oldest first.
    async fn chat_history(&self, user_id: &str) -> anyhow::Result<Vec<HistoryRecord>>;
}
