use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: Sender, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, Utc::now())
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot, Utc::now())
    }
}

/// Coarse mood classification. Declaration order is the detection priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Happy,
    Sad,
    Angry,
    Anxious,
    Stressed,
    Calm,
    Tired,
    Excited,
}

impl MoodLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::Happy => "happy",
            MoodLabel::Sad => "sad",
            MoodLabel::Angry => "angry",
            MoodLabel::Anxious => "anxious",
            MoodLabel::Stressed => "stressed",
            MoodLabel::Calm => "calm",
            MoodLabel::Tired => "tired",
            MoodLabel::Excited => "excited",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mood intensity, always within `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IntensityScore(u8);

impl IntensityScore {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 10;

    /// Returns `None` when `value` falls outside `1..=10`.
    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for IntensityScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        IntensityScore::new(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("score {} outside 1..=10", raw)))
    }
}

/// A detected mood paired with its externally estimated intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodLogEntry {
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub mood: MoodLabel,
    pub notes: String,
    pub score: IntensityScore,
}

impl MoodLogEntry {
    pub fn new(
        user_id: impl Into<String>,
        date: DateTime<Utc>,
        mood: MoodLabel,
        notes: impl Into<String>,
        score: IntensityScore,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            mood,
            notes: notes.into(),
            score,
        }
    }
}

/// Result of the activity detector. Not persisted directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDetection {
    pub activity: String,
    #[serde(rename = "isPositive")]
    pub is_positive: bool,
}

pub const EXERCISE_KIND_ACTIVITY: &str = "activity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseLogEntry {
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: u32,
    pub completed: bool,
}

impl ExerciseLogEntry {
    /// Builds an entry from a detection. Negative mentions never become exercises.
    pub fn from_activity(user_id: impl Into<String>, detection: &ActivityDetection) -> Option<Self> {
        if !detection.is_positive {
            return None;
        }
        Some(Self {
            user_id: user_id.into(),
            name: detection.activity.clone(),
            kind: EXERCISE_KIND_ACTIVITY.to_string(),
            duration: 0,
            completed: false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLogEntry {
    pub user_id: String,
    pub message: String,
    pub sender: Sender,
}

impl ChatLogEntry {
    pub fn for_message(user_id: impl Into<String>, message: &ChatMessage) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.text.clone(),
            sender: message.sender,
        }
    }
}

/// A stored chat turn as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub message: String,
    pub sender: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl HistoryRecord {
    /// Anything not sent by the user is treated as a bot turn. Missing or
    /// unparseable timestamps fall back to `fallback`.
    pub fn into_chat_message(self, fallback: DateTime<Utc>) -> ChatMessage {
        let sender = if self.sender.eq_ignore_ascii_case("user") {
            Sender::User
        } else {
            Sender::Bot
        };
        let timestamp = self
            .created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(fallback);
        ChatMessage::new(self.message, sender, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_intensity_score_bounds() {
        assert!(IntensityScore::new(0).is_none());
        assert!(IntensityScore::new(11).is_none());
        assert!(IntensityScore::new(-3).is_none());
        assert_eq!(IntensityScore::new(1).map(|s| s.get()), Some(1));
        assert_eq!(IntensityScore::new(10).map(|s| s.get()), Some(10));
    }

    #[test]
    fn test_intensity_score_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<IntensityScore>("7").is_ok());
        assert!(serde_json::from_str::<IntensityScore>("42").is_err());
    }

    #[test]
    fn test_mood_entry_wire_format() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let entry = MoodLogEntry::new(
            "u1",
            date,
            MoodLabel::Anxious,
            "I feel anxious today",
            IntensityScore::new(6).unwrap(),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["mood"], "anxious");
        assert_eq!(json["notes"], "I feel anxious today");
        assert_eq!(json["score"], 6);
        assert_eq!(json["date"], "2024-03-01T09:30:00Z");
    }

    #[test]
    fn test_exercise_entry_only_for_positive() {
        let positive = ActivityDetection {
            activity: "Running".into(),
            is_positive: true,
        };
        let negative = ActivityDetection {
            activity: "Running".into(),
            is_positive: false,
        };
        assert!(ExerciseLogEntry::from_activity("u1", &negative).is_none());

        let entry = ExerciseLogEntry::from_activity("u1", &positive).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "Running");
        assert_eq!(json["type"], "activity");
        assert_eq!(json["duration"], 0);
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn test_chat_log_entry_sender() {
        let msg = ChatMessage::bot("hello there");
        let entry = ChatLogEntry::for_message("u1", &msg);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["sender"], "bot");
        assert_eq!(json["message"], "hello there");
    }

    #[test]
    fn test_history_record_conversion() {
        let fallback = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let record = HistoryRecord {
            message: "hi".into(),
            sender: "user".into(),
            created_at: Some("2024-02-02T10:00:00+02:00".into()),
        };
        let msg = record.into_chat_message(fallback);
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(msg.timestamp, Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap());

        let record = HistoryRecord {
            message: "hello".into(),
            sender: "assistant".into(),
            created_at: Some("yesterday".into()),
        };
        let msg = record.into_chat_message(fallback);
        assert_eq!(msg.sender, Sender::Bot);
        assert_eq!(msg.timestamp, fallback);
    }
}
