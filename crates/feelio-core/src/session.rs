//! Session log: bounded, chronological record of completed turns.
//!
//! The log feeds the end-of-session summary (emotion timeline + recent transcript window) and,
//! when session logging is enabled, the JSON record written at teardown.

use crate::emotion::EmotionLabel;
use crate::error::{FeelioError, FeelioResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default number of turns kept in memory.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default window for [`SessionLog::emotion_timeline`].
pub const DEFAULT_TIMELINE_COUNT: usize = 20;

/// Default window for [`SessionLog::recent_turns`].
pub const DEFAULT_RECENT_TURNS: usize = 6;

/// Current time as fractional unix seconds.
pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// One completed turn. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    timestamp: f64,
    user_text: String,
    ai_text: String,
    emotion: EmotionLabel,
}

impl SessionEntry {
    pub fn new(user_text: impl Into<String>, ai_text: impl Into<String>, emotion: EmotionLabel) -> Self {
        Self::at(unix_now(), user_text, ai_text, emotion)
    }

    pub fn at(
        timestamp: f64,
        user_text: impl Into<String>,
        ai_text: impl Into<String>,
        emotion: EmotionLabel,
    ) -> Self {
        Self {
            timestamp,
            user_text: user_text.into(),
            ai_text: ai_text.into(),
            emotion,
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn ai_text(&self) -> &str {
        &self.ai_text
    }

    pub fn emotion(&self) -> EmotionLabel {
        self.emotion
    }

    /// Plain record used in summaries and the persisted session file.
    pub fn to_record(&self) -> TurnRecord {
        TurnRecord {
            timestamp: self.timestamp,
            user: self.user_text.clone(),
            ai: self.ai_text.clone(),
            emotion: self.emotion,
        }
    }
}

/// Serializable view of a turn: `{timestamp, user, ai, emotion}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub timestamp: f64,
    pub user: String,
    pub ai: String,
    pub emotion: EmotionLabel,
}

/// Ordered turns, oldest evicted once `max_entries` is exceeded.
#[derive(Debug, Clone)]
pub struct SessionLog {
    entries: VecDeque<SessionEntry>,
    max_entries: usize,
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl SessionLog {
    /// `max_entries` of zero is treated as one so the latest turn is always retained.
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::with_capacity(max_entries.min(DEFAULT_MAX_ENTRIES)),
            max_entries,
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Log a turn stamped with the current time.
    pub fn add_turn(
        &mut self,
        user_text: impl Into<String>,
        ai_text: impl Into<String>,
        emotion: EmotionLabel,
    ) {
        self.push(SessionEntry::new(user_text, ai_text, emotion));
    }

    pub fn push(&mut self, entry: SessionEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
        debug!(target: "feelio::session", total = self.entries.len(), "session turn logged");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &SessionEntry> {
        self.entries.iter()
    }

    fn tail(&self, count: usize) -> impl Iterator<Item = &SessionEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(count))
    }

    /// Emotions of the last `recent_count` turns, oldest first.
    pub fn emotion_timeline(&self, recent_count: usize) -> Vec<EmotionLabel> {
        self.tail(recent_count).map(|e| e.emotion).collect()
    }

    /// Last `count` turns as plain records, oldest first.
    pub fn recent_turns(&self, count: usize) -> Vec<TurnRecord> {
        self.tail(count).map(SessionEntry::to_record).collect()
    }

    /// Record of every retained turn, stamped now.
    pub fn to_session_record(&self) -> SessionRecord {
        SessionRecord {
            timestamp: chrono::Utc::now().timestamp(),
            turns: self.recent_turns(self.len()),
        }
    }
}

/// Persisted form of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unix seconds at teardown; also names the file.
    pub timestamp: i64,
    pub turns: Vec<TurnRecord>,
}

impl SessionRecord {
    pub fn file_name(&self) -> String {
        format!("session_{}.json", self.timestamp)
    }

    /// Write pretty JSON under `dir` (created if missing). Returns the file path.
    pub fn save_to_dir(&self, dir: &Path) -> FeelioResult<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| FeelioError::Persistence(e.to_string()))?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| FeelioError::Persistence(e.to_string()))?;
        info!(target: "feelio::session", path = %path.display(), turns = self.turns.len(), "session saved");
        Ok(path)
    }

    pub fn load(path: &Path) -> FeelioResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| FeelioError::Persistence(e.to_string()))?;
        Ok(serde_json::from_str(&content)?)
    }
}
