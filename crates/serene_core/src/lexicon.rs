//! Fixed word lists shared by the mood and activity detectors.
//!
//! All entries are lower-case; detectors lower-case the input before matching.

use crate::model::MoodLabel;

/// Mood words in detection priority order.
pub const MOODS: [MoodLabel; 8] = [
    MoodLabel::Happy,
    MoodLabel::Sad,
    MoodLabel::Angry,
    MoodLabel::Anxious,
    MoodLabel::Stressed,
    MoodLabel::Calm,
    MoodLabel::Tired,
    MoodLabel::Excited,
];

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "love", "enjoy", "like", "happy", "good", "great", "better", "fun", "amazing", "awesome",
    "relaxing", "excited", "wonderful", "nice", "glad",
];

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "hate", "dislike", "bad", "worse", "terrible", "awful", "boring", "sad", "angry",
    "annoying", "horrible", "stressful", "tired",
];

pub const KNOWN_ACTIVITIES: &[&str] = &[
    "running",
    "walking",
    "jogging",
    "swimming",
    "cycling",
    "hiking",
    "yoga",
    "meditation",
    "reading",
    "writing",
    "painting",
    "drawing",
    "cooking",
    "baking",
    "gardening",
    "dancing",
    "singing",
    "music",
    "guitar",
    "piano",
    "chess",
    "gaming",
    "football",
    "soccer",
    "basketball",
    "tennis",
    "gym",
    "workout",
    "exercise",
    "journaling",
    "knitting",
    "photography",
    "fishing",
    "climbing",
];

/// Verbs that usually introduce an activity phrase ("playing ...", "watching ...").
pub const ACTIVITY_VERBS: &[&str] = &[
    "running",
    "reading",
    "playing",
    "watching",
    "listening to",
    "practicing",
    "learning",
    "doing",
    "going",
    "making",
];

/// Leading words stripped from a candidate phrase.
pub const ARTICLES: &[&str] = &["to", "the", "a", "an"];

/// Candidates starting with one of these are too ambiguous to log.
pub const PRONOUNS: &[&str] = &["it", "this", "that", "they", "he", "she", "we", "you"];

pub fn is_known_activity(word: &str) -> bool {
    KNOWN_ACTIVITIES.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_activity_count() {
        assert_eq!(KNOWN_ACTIVITIES.len(), 34);
    }

    #[test]
    fn test_tables_are_lowercase() {
        for word in POSITIVE_KEYWORDS
            .iter()
            .chain(NEGATIVE_KEYWORDS)
            .chain(KNOWN_ACTIVITIES)
            .chain(ACTIVITY_VERBS)
        {
            assert_eq!(*word, word.to_lowercase());
        }
    }

    #[test]
    fn test_mood_priority_starts_with_happy() {
        assert_eq!(MOODS[0], MoodLabel::Happy);
        assert_eq!(MOODS[1], MoodLabel::Sad);
        assert_eq!(MOODS[7], MoodLabel::Excited);
    }
}
