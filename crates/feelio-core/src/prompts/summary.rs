//! Session handoff prompt built from the emotion timeline and the recent transcript.

use crate::emotion::EmotionLabel;
use crate::session::TurnRecord;

/// Fixed instruction preceding the session data.
pub const SUMMARY_INSTRUCTION: &str = "You are an AI therapist preparing a concise session handoff. \
Summarize the session in 3 bullet points: \
(1) observed emotions trend, (2) key concerns, (3) agreed small actions. \
Keep it under 80 words.";

/// Instruction followed by the literal timeline and turns (both as JSON).
pub fn build_summary_prompt(emotion_timeline: &[EmotionLabel], recent_turns: &[TurnRecord]) -> String {
    let timeline = serde_json::to_string(emotion_timeline).unwrap_or_else(|_| "[]".to_string());
    let turns = serde_json::to_string(recent_turns).unwrap_or_else(|_| "[]".to_string());
    format!(
        "{SUMMARY_INSTRUCTION} Recent emotions: {timeline}. Transcript snippets: {turns}"
    )
}
