//! Delivery pacing derived from how much the user just said.
//!
//! Long utterances get a slower reply and a longer pause before speaking.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Word count above which the reply slows down.
pub const DEFAULT_PACE_THRESHOLD: usize = 18;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceHint {
    #[default]
    Normal,
    Slower,
}

impl PaceHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaceHint::Normal => "normal",
            PaceHint::Slower => "slower",
        }
    }

    /// Seconds of silence before the reply is spoken.
    pub fn pre_pause_seconds(&self) -> f32 {
        match self {
            PaceHint::Slower => 0.8,
            PaceHint::Normal => 0.2,
        }
    }

    pub fn pre_pause(&self) -> Duration {
        Duration::from_secs_f32(self.pre_pause_seconds())
    }

    pub fn is_slower(&self) -> bool {
        matches!(self, PaceHint::Slower)
    }
}

impl fmt::Display for PaceHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of `\w+` runs in `text`.
pub fn word_count(text: &str) -> usize {
    WORD.find_iter(text).count()
}

/// `Slower` strictly above `threshold` words.
pub fn pace_hint(word_count: usize, threshold: usize) -> PaceHint {
    if word_count > threshold {
        PaceHint::Slower
    } else {
        PaceHint::Normal
    }
}

pub fn pre_pause(hint: PaceHint) -> f32 {
    hint.pre_pause_seconds()
}

/// Per-turn pacing. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacingDecision {
    pub pace_hint: PaceHint,
    pub pre_pause_seconds: f32,
}

impl PacingDecision {
    pub fn for_text(text: &str, threshold: usize) -> Self {
        Self::from_hint(pace_hint(word_count(text), threshold))
    }

    pub fn from_hint(pace_hint: PaceHint) -> Self {
        Self {
            pace_hint,
            pre_pause_seconds: pace_hint.pre_pause_seconds(),
        }
    }

    /// Pacing for the crisis message: always slow, with a half-second lead-in.
    pub fn crisis() -> Self {
        Self {
            pace_hint: PaceHint::Slower,
            pre_pause_seconds: 0.5,
        }
    }

    pub fn pre_pause(&self) -> Duration {
        Duration::from_secs_f32(self.pre_pause_seconds.max(0.0))
    }
}
