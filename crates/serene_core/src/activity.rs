//! Heuristic activity extraction from free-text chat messages.
//!
//! Layered fallback, tuned for recall over precision:
//! 1. sentiment gate (no sentiment keyword, no activity)
//! 2. direct lookup against the known-activity table
//! 3. phrase extraction patterns, each later match replacing the earlier one
//! 4. text following an activity verb
//! 5. normalization of the candidate phrase
//!
//! Matching is substring based throughout, same as the mood detector.

use crate::lexicon::{
    is_known_activity, ACTIVITY_VERBS, ARTICLES, KNOWN_ACTIVITIES, NEGATIVE_KEYWORDS,
    POSITIVE_KEYWORDS, PRONOUNS,
};
use crate::model::ActivityDetection;
use regex::Regex;
use std::sync::LazyLock;

static RE_PREFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(i|me|my) (love|enjoy|like|hate|dislike) (to )?(.+)").unwrap()
});
static RE_FEELING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+) makes me feel (good|better|bad|worse)").unwrap());
static RE_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(i|me|my) (am|was|were) (doing )?(.+)").unwrap());
static RE_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(?:{})\s+", ARTICLES.join("|"))).unwrap());
static RE_TOKEN_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\p{P}]+").unwrap());

/// Extract an activity mention and its sentiment polarity from `text`.
///
/// `is_positive` is true whenever any positive keyword is present, even if
/// negative keywords are present too.
pub fn detect_activity(text: &str) -> Option<ActivityDetection> {
    let lower = text.to_lowercase();
    let has_positive = contains_any(&lower, POSITIVE_KEYWORDS);
    let has_negative = contains_any(&lower, NEGATIVE_KEYWORDS);

    if !has_positive && !has_negative {
        return None;
    }

    if let Some(known) = KNOWN_ACTIVITIES.iter().find(|a| lower.contains(*a)) {
        return Some(ActivityDetection {
            activity: capitalize(known),
            is_positive: has_positive,
        });
    }

    let candidate = extract_by_pattern(&lower).or_else(|| extract_after_verb(&lower))?;
    let detection = normalize_candidate(&candidate, has_positive);
    if detection.is_none() {
        tracing::debug!("Discarded ambiguous activity candidate: {:?}", candidate);
    }
    detection
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// All three patterns run; a later match overwrites an earlier one.
fn extract_by_pattern(lower: &str) -> Option<String> {
    let mut candidate = None;

    if let Some(phrase) = RE_PREFERENCE.captures(lower).and_then(|c| c.get(4)) {
        candidate = Some(phrase.as_str().to_string());
    }
    if let Some(phrase) = RE_FEELING.captures(lower).and_then(|c| c.get(1)) {
        candidate = Some(phrase.as_str().to_string());
    }
    if let Some(phrase) = RE_STATE.captures(lower).and_then(|c| c.get(4)) {
        candidate = Some(phrase.as_str().to_string());
    }

    candidate
}

/// Text between the first and second occurrence of the first matching verb.
fn extract_after_verb(lower: &str) -> Option<String> {
    let verb = ACTIVITY_VERBS.iter().find(|v| lower.contains(*v))?;
    lower.split(verb).nth(1).map(str::to_string)
}

fn normalize_candidate(candidate: &str, is_positive: bool) -> Option<ActivityDetection> {
    let phrase = RE_ARTICLE.replace(candidate.trim(), "");
    let phrase = phrase.trim();

    let token = RE_TOKEN_BOUNDARY
        .split(phrase)
        .find(|t| !t.is_empty())?;

    if is_known_activity(token) {
        return Some(ActivityDetection {
            activity: capitalize(token),
            is_positive,
        });
    }

    if PRONOUNS.contains(&token) {
        return None;
    }

    Some(ActivityDetection {
        activity: capitalize(phrase),
        is_positive,
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
