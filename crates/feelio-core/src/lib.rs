//! feelio-core: emotion-aware dialogue engine.
//!
//! Fuses what the user says with the facial-expression label observed for the turn, screens for
//! crisis language, picks a coping playbook, paces the reply and keeps a bounded session log.
//! Capture, generation and delivery are traits so the same loop serves the terminal session and
//! the HTTP gateway.

mod config;
mod error;
mod logging;

pub mod contradiction;
pub mod emotion;
pub mod generator;
pub mod history;
pub mod orchestrator;
pub mod pacing;
pub mod playbook;
pub mod prompts;
pub mod safety;
pub mod session;
pub mod vision;

pub use self::config::{FeelioConfig, LlmMode, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use error::{ErrorKind, FeelioError, FeelioResult};
pub use logging::init_logging;

pub use contradiction::Contradiction;
pub use emotion::EmotionLabel;
pub use generator::{clean_reply, MockGenerator, OpenRouterGenerator, TextGenerator};
pub use history::{EmotionHistory, EmotionObservation, Trajectory, HISTORY_CAPACITY};
pub use orchestrator::{
    is_exit_intent, DialogueOrchestrator, DialogueSettings, DialogueState, ReplySink,
    SessionSummary, TurnOutcome, TurnReply, UtteranceSource, APOLOGY, FAREWELL,
};
pub use pacing::{PaceHint, PacingDecision};
pub use playbook::Playbook;
pub use session::{SessionEntry, SessionLog, SessionRecord, TurnRecord};
pub use vision::{decode_frame, EmotionClassifier, EmotionSource, LatestEmotion, NeutralClassifier};
