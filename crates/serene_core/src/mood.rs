//! Keyword mood detection.
//!
//! Plain substring containment, so "unhappy" still reads as happy.

use crate::lexicon::MOODS;
use crate::model::MoodLabel;

/// Returns the first mood word (in lexicon order) contained in `text`.
pub fn detect_mood(text: &str) -> Option<MoodLabel> {
    let lower = text.to_lowercase();
    MOODS.iter().copied().find(|mood| lower.contains(mood.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(detect_mood(""), None);
    }

    #[test]
    fn test_no_mood_word() {
        assert_eq!(detect_mood("went to the shop for milk"), None);
    }

    #[test]
    fn test_single_mood_case_insensitive() {
        assert_eq!(detect_mood("I am SO Tired today"), Some(MoodLabel::Tired));
        assert_eq!(detect_mood("feeling anxious about the exam"), Some(MoodLabel::Anxious));
    }

    #[test]
    fn test_lexicon_order_beats_text_position() {
        // "sad" appears first in the text but "happy" is declared first.
        assert_eq!(detect_mood("sad morning, happy evening"), Some(MoodLabel::Happy));
        assert_eq!(detect_mood("excited but stressed"), Some(MoodLabel::Stressed));
    }

    #[test]
    fn test_substring_match_is_kept() {
        assert_eq!(detect_mood("I feel unhappy"), Some(MoodLabel::Happy));
    }
}
