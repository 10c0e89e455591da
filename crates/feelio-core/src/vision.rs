//! Camera frames in, one emotion label out.
//!
//! The classifier itself is an external collaborator; this module owns the frame decoding at
//! the transport boundary and the shared "latest emotion" slot a session reads each turn.

use crate::emotion::EmotionLabel;
use crate::error::{FeelioError, FeelioResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::{Arc, RwLock};

/// Facial-expression classifier. Must return [`EmotionLabel::Neutral`] when no face is found
/// or the frame cannot be read; it never fails.
pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, frame: &[u8]) -> EmotionLabel;
}

/// Classifier used when no model is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralClassifier;

impl EmotionClassifier for NeutralClassifier {
    fn classify(&self, _frame: &[u8]) -> EmotionLabel {
        EmotionLabel::Neutral
    }
}

/// Decode a base64 frame, accepting an optional `data:image/...;base64,` prefix.
pub fn decode_frame(encoded: &str) -> FeelioResult<Vec<u8>> {
    let payload = match encoded.split_once(',') {
        Some((head, body)) if head.starts_with("data:") => body,
        _ => encoded,
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| FeelioError::FrameDecode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(FeelioError::FrameDecode("empty frame".to_string()));
    }
    Ok(bytes)
}

/// Source of the emotion label consulted at the start of each turn.
pub trait EmotionSource: Send + Sync {
    fn current(&self) -> EmotionLabel;
}

/// Latest label written by the vision path, read by the dialogue loop.
#[derive(Debug, Clone, Default)]
pub struct LatestEmotion {
    slot: Arc<RwLock<EmotionLabel>>,
}

impl LatestEmotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, label: EmotionLabel) {
        match self.slot.write() {
            Ok(mut guard) => *guard = label,
            Err(poisoned) => *poisoned.into_inner() = label,
        }
    }

    pub fn get(&self) -> EmotionLabel {
        match self.slot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl EmotionSource for LatestEmotion {
    fn current(&self) -> EmotionLabel {
        self.get()
    }
}

/// A fixed label, for scripted runs.
impl EmotionSource for EmotionLabel {
    fn current(&self) -> EmotionLabel {
        *self
    }
}
