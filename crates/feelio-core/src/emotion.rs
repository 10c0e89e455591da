//! Emotion labels produced by the facial classifier.
//!
//! The classifier is a black box: it emits one label from a closed set, and `neutral` whenever
//! no face is found or the frame cannot be read. Everything downstream (history, contradiction,
//! playbooks) works on this enum rather than raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of labels the emotion classifier may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    #[default]
    Neutral,
    Happy,
    Sad,
    Fear,
    Angry,
    Disgust,
    Surprise,
}

impl EmotionLabel {
    /// Every label, in classifier order.
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Neutral,
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Fear,
        EmotionLabel::Angry,
        EmotionLabel::Disgust,
        EmotionLabel::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Surprise => "surprise",
        }
    }

    /// Strict parse: `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "neutral" => Some(EmotionLabel::Neutral),
            "happy" => Some(EmotionLabel::Happy),
            "sad" => Some(EmotionLabel::Sad),
            "fear" => Some(EmotionLabel::Fear),
            "angry" => Some(EmotionLabel::Angry),
            "disgust" => Some(EmotionLabel::Disgust),
            "surprise" => Some(EmotionLabel::Surprise),
            _ => None,
        }
    }

    /// Lenient parse used at the transport boundary: unknown labels collapse to `Neutral`,
    /// matching the classifier's own failure behavior.
    pub fn from_label(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Membership in the distress subset {sad, fear, angry, disgust, surprise}.
    #[inline]
    pub fn is_distress(&self) -> bool {
        !matches!(self, EmotionLabel::Neutral | EmotionLabel::Happy)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
