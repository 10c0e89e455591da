//! Words-versus-face contradiction check.
//!
//! Flags turns where the user says they are fine but the classifier sees distress, so the
//! generator can invite a gentle check-in instead of taking the words at face value.

use crate::emotion::EmotionLabel;
use std::fmt;

/// Reassurance tokens matched as substrings of the lower-cased utterance.
pub const REASSURANCE_WORDS: &[&str] = &["fine", "okay", "good"];

/// Sentinel placed in the prompt when nothing contradicts.
pub const NONE_NOTED: &str = "none noted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contradiction {
    None,
    /// Reassuring words paired with a distress label.
    SaysFineLooks(EmotionLabel),
}

impl Contradiction {
    pub fn assess(user_text: &str, emotion: EmotionLabel) -> Self {
        let text = user_text.to_lowercase();
        let says_fine = REASSURANCE_WORDS.iter().any(|w| text.contains(w));
        if says_fine && emotion.is_distress() {
            Contradiction::SaysFineLooks(emotion)
        } else {
            Contradiction::None
        }
    }
}

/// Prompt-ready contradiction flag, or [`NONE_NOTED`].
pub fn detect(user_text: &str, emotion: EmotionLabel) -> String {
    Contradiction::assess(user_text, emotion).to_string()
}

impl fmt::Display for Contradiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contradiction::None => f.write_str(NONE_NOTED),
            Contradiction::SaysFineLooks(emotion) => write!(
                f,
                "User says fine but looks {}. Invite gentle check-in.",
                emotion
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fine_while_sad_is_flagged() {
        let flag = detect("I'm fine", EmotionLabel::Sad);
        assert_ne!(flag, NONE_NOTED);
        assert_eq!(flag, "User says fine but looks sad. Invite gentle check-in.");
    }

    #[test]
    fn fine_while_happy_is_consistent() {
        assert_eq!(detect("I'm fine", EmotionLabel::Happy), NONE_NOTED);
        assert_eq!(detect("All good", EmotionLabel::Neutral), NONE_NOTED);
    }

    #[test]
    fn distress_without_reassurance_is_not_a_contradiction() {
        assert_eq!(detect("I'm tired", EmotionLabel::Sad), NONE_NOTED);
    }

    #[test]
    fn reassurance_match_is_case_insensitive() {
        assert_eq!(
            Contradiction::assess("OKAY I guess", EmotionLabel::Fear),
            Contradiction::SaysFineLooks(EmotionLabel::Fear)
        );
    }
}
