//! Fusion prompt: words, face, trend, contradiction, playbook and pace in one block.
//!
//! Pure formatting. Every input lands in the output verbatim and nothing branches on content, so
//! identical inputs always produce byte-identical prompts.

use crate::emotion::EmotionLabel;
use crate::pacing::PaceHint;

/// The five numbered directives closing every fusion prompt.
pub const FUSION_DIRECTIVES: &str = "INSTRUCTION: \
1) Validate based on words + emotion, \
2) offer ONE specific tool right now, \
3) keep under 3 sentences, \
4) if contradiction, invite gentle clarification, \
5) match the pace hint (slightly slower if requested).";

pub fn build_fusion_prompt(
    user_text: &str,
    emotion: EmotionLabel,
    trajectory: &str,
    contradiction: &str,
    playbook: &str,
    pace_hint: PaceHint,
) -> String {
    format!(
        "CONTEXT: Short, solution-focused spoken therapy. \
USER SAID: '{user_text}'. \
EMOTIONAL STATE: '{emotion}'. \
EMOTION TRAJECTORY: {trajectory}. \
CONTRADICTION FLAG: {contradiction}. \
SUGGESTED PLAYBOOK: {playbook}. \
PACE HINT: {pace_hint}. \
{FUSION_DIRECTIVES}"
    )
}
