//! Coping playbooks: one short, concrete directive per turn.
//!
//! Stated intent outranks the face. If the user names panic, sleep trouble or overwhelm, that
//! playbook wins regardless of the classifier label; otherwise the emotion catalog decides, and
//! anything the catalog does not cover falls back to [`Playbook::Default`].

use crate::emotion::EmotionLabel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every directive the selector can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Playbook {
    // Intent-routed
    PanicKit,
    SleepWindDown,
    OverwhelmTriage,
    // Emotion catalog
    Activation,
    Grounding,
    CoolDown,
    NameThenReframe,
    BoxBreathing,
    MicroCheckIn,
    /// Explicit fallback for labels without a catalog entry.
    Default,
}

/// Intent keywords in priority order; the first group with a hit wins.
const INTENT_ROUTES: &[(&[&str], Playbook)] = &[
    (&["panic", "anxious"], Playbook::PanicKit),
    (&["sleep", "insomnia"], Playbook::SleepWindDown),
    (&["overwhelm", "burnout"], Playbook::OverwhelmTriage),
];

impl Playbook {
    /// Intent first, then the emotion catalog.
    pub fn select(emotion: EmotionLabel, user_text: &str) -> Self {
        Self::for_intent(user_text).unwrap_or_else(|| Self::for_emotion(emotion))
    }

    /// Same as [`Playbook::select`] for an unparsed label; labels outside the closed set resolve
    /// to [`Playbook::Default`] unless an intent matches.
    pub fn select_raw(label: &str, user_text: &str) -> Self {
        Self::for_intent(user_text).unwrap_or_else(|| {
            EmotionLabel::parse(label)
                .map(Self::for_emotion)
                .unwrap_or(Playbook::Default)
        })
    }

    pub fn for_intent(user_text: &str) -> Option<Self> {
        let text = user_text.to_lowercase();
        INTENT_ROUTES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
            .map(|(_, playbook)| *playbook)
    }

    /// Catalog lookup. Exhaustive over the label set so a new label cannot silently miss.
    pub fn for_emotion(emotion: EmotionLabel) -> Self {
        match emotion {
            EmotionLabel::Sad => Playbook::Activation,
            EmotionLabel::Fear => Playbook::Grounding,
            EmotionLabel::Angry => Playbook::CoolDown,
            EmotionLabel::Disgust => Playbook::NameThenReframe,
            EmotionLabel::Surprise => Playbook::BoxBreathing,
            EmotionLabel::Neutral => Playbook::MicroCheckIn,
            EmotionLabel::Happy => Playbook::Default,
        }
    }

    pub fn directive(&self) -> &'static str {
        match self {
            Playbook::PanicKit => {
                "Panic kit: 3 paced breaths (inhale 4, exhale 6) plus name 3 things you see."
            }
            Playbook::SleepWindDown => {
                "Sleep wind-down: lights dim, slow exhale 6s for 1 minute, then write one worry and shelve it till morning."
            }
            Playbook::OverwhelmTriage => {
                "Overwhelm triage: list top 3 tasks, pick one 10-minute starter and ignore the rest for 30 minutes."
            }
            Playbook::Activation => {
                "Run a 5-minute activation: stand, stretch, and text one friend a kind line."
            }
            Playbook::Grounding => "Try 5-4-3-2-1 grounding with one slow exhale per step.",
            Playbook::CoolDown => {
                "Cool-down reset: cold water on wrists + step outside for 2 minutes before replying to anyone."
            }
            Playbook::NameThenReframe => {
                "Name-then-reframe: label the trigger, then list one boundary you can set today."
            }
            Playbook::BoxBreathing => {
                "Stabilize with box breathing: 4 in, 4 hold, 4 out, 4 hold for two cycles."
            }
            Playbook::MicroCheckIn => {
                "Micro check-in: what mattered most today? Pick one tiny action that honors it in 5 minutes."
            }
            Playbook::Default => {
                "Pick one concrete action in 5 minutes (move, text, or jot a thought). Keep it small and doable."
            }
        }
    }
}

impl fmt::Display for Playbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive())
    }
}

/// Prompt-ready directive for this turn.
pub fn select(emotion: EmotionLabel, user_text: &str) -> &'static str {
    Playbook::select(emotion, user_text).directive()
}
