//! Per-message side effects of a conversation.
//!
//! Every call here is fire-and-forget: work runs on a detached tokio task,
//! failures go to the diagnostic log and never reach the caller. Chat, mood
//! and exercise logging run on separate tasks so one failing cannot block
//! another.

use crate::intensity::IntensityEstimator;
use chrono::{DateTime, Utc};
use serene_core::{
    ActivityDetection, ApiError, ChatLogEntry, ChatMessage, ExerciseLogEntry, MoodLabel, MoodLogEntry,
    WellnessApi,
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

pub struct ConversationLogger {
    user_id: String,
    api: Arc<dyn WellnessApi>,
    estimator: Arc<IntensityEstimator>,
    // Dropping a JoinHandle detaches the task, so outstanding logs still finish.
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl ConversationLogger {
    pub fn new(user_id: impl Into<String>, api: Arc<dyn WellnessApi>, estimator: IntensityEstimator) -> Self {
        Self {
            user_id: user_id.into(),
            api,
            estimator: Arc::new(estimator),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Persist one transcript turn. Unconditional, one entry per message.
    pub fn log_chat(&self, message: &ChatMessage) {
        let entry = ChatLogEntry::for_message(&self.user_id, message);
        let api = self.api.clone();
        self.spawn(async move {
            if let Err(e) = api.log_chat(&entry).await {
                tracing::warn!(
                    "Chat log for {} message {} (ignored): {:#}",
                    entry.sender,
                    failure_kind(&e),
                    e
                );
            }
        });
    }

    /// Persist whatever the detectors found in a user message.
    ///
    /// A mood is only logged once the estimator returns a valid score; an
    /// activity only when it was mentioned with positive sentiment.
    pub fn log_signals(
        &self,
        text: &str,
        detected_at: DateTime<Utc>,
        mood: Option<MoodLabel>,
        activity: Option<ActivityDetection>,
    ) {
        if let Some(mood) = mood {
            let api = self.api.clone();
            let estimator = self.estimator.clone();
            let user_id = self.user_id.clone();
            let text = text.to_string();
            self.spawn(async move {
                record_mood(api.as_ref(), &estimator, &user_id, &text, mood, detected_at).await;
            });
        }

        if let Some(activity) = activity {
            let api = self.api.clone();
            let user_id = self.user_id.clone();
            self.spawn(async move {
                record_activity(api.as_ref(), &user_id, &activity).await;
            });
        }
    }

    /// Wait for every log task spawned so far.
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.lock_pending());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Log task ended abnormally: {}", e);
            }
        }
    }

    /// Number of log tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.lock_pending().iter().filter(|h| !h.is_finished()).count()
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut pending = self.lock_pending();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Score a detected mood and log it. Returns the entry that was sent, if any.
pub async fn record_mood(
    api: &dyn WellnessApi,
    estimator: &IntensityEstimator,
    user_id: &str,
    text: &str,
    mood: MoodLabel,
    detected_at: DateTime<Utc>,
) -> Option<MoodLogEntry> {
    let Some(score) = estimator.predict_mood_score(text, mood).await else {
        tracing::debug!("No intensity score for mood '{}', skipping mood log", mood);
        return None;
    };

    let entry = MoodLogEntry::new(user_id, detected_at, mood, text, score);
    match api.log_mood(&entry).await {
        Ok(()) => {
            tracing::info!("Logged mood '{}' with intensity {}", mood, score.get());
            Some(entry)
        }
        Err(e) => {
            tracing::warn!("Mood log {} (ignored): {:#}", failure_kind(&e), e);
            None
        }
    }
}

/// Log a positively mentioned activity as an exercise entry.
pub async fn record_activity(
    api: &dyn WellnessApi,
    user_id: &str,
    activity: &ActivityDetection,
) -> Option<ExerciseLogEntry> {
    let Some(entry) = ExerciseLogEntry::from_activity(user_id, activity) else {
        tracing::debug!("Activity '{}' mentioned negatively, not logged", activity.activity);
        return None;
    };

    match api.log_exercise(&entry).await {
        Ok(()) => {
            tracing::info!("Logged activity '{}'", entry.name);
            Some(entry)
        }
        Err(e) => {
            tracing::warn!("Activity log {} (ignored): {:#}", failure_kind(&e), e);
            None
        }
    }
}

/// A 4xx means the server refused this payload; anything else is an outage.
fn failure_kind(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) if api_err.is_rejection() => "rejected by server",
        _ => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_failure_kind() {
        let rejected: anyhow::Error = ApiError::Status {
            status: 422,
            message: "bad payload".into(),
        }
        .into();
        assert_eq!(failure_kind(&rejected), "rejected by server");

        let unavailable: anyhow::Error = ApiError::Status {
            status: 503,
            message: "down".into(),
        }
        .into();
        assert_eq!(failure_kind(&unavailable), "failed");

        let refused: anyhow::Error = ApiError::Http("connection refused".into()).into();
        assert_eq!(failure_kind(&refused), "failed");

        let wrapped = Err::<(), _>(ApiError::Status {
            status: 400,
            message: "missing field".into(),
        })
        .context("posting mood log")
        .unwrap_err();
        assert_eq!(failure_kind(&wrapped), "rejected by server");
    }
}
