//! Safety net: keyword screen for self-harm and crisis language.
//!
//! Matching is plain substring containment on the lower-cased text, not token matching, so
//! phrase variants ("I really want to die today", "self-harm again") are caught. Over-triggering
//! is accepted.
//!
//! Input usually arrives through speech-to-text, so known homophones are folded onto the word
//! the keyword list uses before matching ("dye" is screened as "die").

use tracing::warn;

/// Lower-case phrases that trigger the crisis override.
pub const SAFETY_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "hurt myself",
    "self harm",
    "self-harm",
    "cut myself",
    "want to die",
    "no reason to live",
    "give up",
];

/// Transcription homophones rewritten before matching: (heard, screened as).
pub const SPOKEN_VARIANTS: &[(&str, &str)] = &[("dye", "die")];

/// Fixed reply used whenever the screen fires. Never generated, never randomized.
pub const CRISIS_RESPONSE: &str = "I hear you mentioning harm. Your safety matters. \
If you are in danger, contact a local emergency number or a trusted person right now. \
I can listen and help you plan one safe step.";

/// Phrases from [`SAFETY_KEYWORDS`] present in `text`, in list order.
pub fn matched_phrases(text: &str) -> Vec<&'static str> {
    let lowered = normalize(text);
    SAFETY_KEYWORDS
        .iter()
        .copied()
        .filter(|phrase| lowered.contains(phrase))
        .collect()
}

/// True when any safety phrase appears anywhere in `text`.
pub fn is_high_risk(text: &str) -> bool {
    let lowered = normalize(text);
    let hit = SAFETY_KEYWORDS.iter().any(|phrase| lowered.contains(phrase));
    if hit {
        // Never log the utterance itself.
        warn!(target: "feelio::safety", "high-risk content detected in user input");
    }
    hit
}

fn normalize(text: &str) -> String {
    SPOKEN_VARIANTS
        .iter()
        .fold(text.to_lowercase(), |acc, &(heard, screened)| acc.replace(heard, screened))
}

/// The crisis-forward safety message.
pub fn crisis_response() -> &'static str {
    CRISIS_RESPONSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_statement_is_flagged() {
        assert!(is_high_risk("I want to die"));
        assert!(is_high_risk("Sometimes I think about SUICIDE"));
        assert!(is_high_risk("there's no reason to live anymore"));
    }

    #[test]
    fn substring_over_trigger_is_intentional() {
        // "dye" is screened as its homophone and "give up" fires inside unrelated phrases.
        // Both are the accepted cost of substring matching on transcribed speech.
        assert!(is_high_risk("I want to dye my hair"));
        assert!(is_high_risk("I won't give up on my diet"));
    }

    #[test]
    fn ordinary_text_is_not_flagged() {
        assert!(!is_high_risk("I had a long day at work"));
        assert!(!is_high_risk(""));
    }

    #[test]
    fn matched_phrases_reports_every_hit() {
        assert_eq!(
            matched_phrases("I want to hurt myself, I want to die"),
            vec!["hurt myself", "want to die"]
        );
        assert!(matched_phrases("fine thanks").is_empty());
    }

    #[test]
    fn crisis_response_is_fixed() {
        assert_eq!(crisis_response(), crisis_response());
        assert!(crisis_response().contains("emergency"));
    }
}
