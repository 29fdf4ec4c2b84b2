use serene_core::MoodLabel;

pub const INTENSITY_SYSTEM_PROMPT: &str =
    "You rate the intensity of emotions in text. Respond with a single integer and nothing else.";

/// Fixed template for the intensity request. The model is asked for a bare number.
pub fn intensity_prompt(message: &str, mood: MoodLabel) -> String {
    format!(
        "On a scale from 1 to 10, how intense is the \"{}\" mood expressed in this message?\n\
         Message: \"{}\"\n\
         Respond with only a number between 1 and 10.",
        mood, message
    )
}
