//! Dialogue orchestrator: one conversation, one turn at a time.
//!
//! ```text
//! Idle -> AwaitingInput -> Screening -> Crisis | (Generating -> Logging -> Delivering)
//!      -> AwaitingInput | Terminated
//! ```
//!
//! Terminated is final: later turns are refused without touching history or the log.
//!
//! The orchestrator exclusively owns the emotion history and the session log. Capture,
//! generation and delivery are external and may fail; every failure is recovered inside the
//! turn. Cancellation is only observed between turns.

use crate::config::FeelioConfig;
use crate::contradiction;
use crate::emotion::EmotionLabel;
use crate::error::FeelioResult;
use crate::generator::{clean_reply, TextGenerator};
use crate::history::EmotionHistory;
use crate::pacing::{PaceHint, PacingDecision};
use crate::playbook;
use crate::prompts::{build_fusion_prompt, build_summary_prompt};
use crate::safety;
use crate::session::{SessionLog, DEFAULT_RECENT_TURNS, DEFAULT_TIMELINE_COUNT};
use crate::vision::EmotionSource;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Words that end the conversation when contained anywhere in an utterance (case-insensitive).
pub const EXIT_WORDS: &[&str] = &["bye", "goodbye", "stop", "exit", "quit"];

/// Substituted when the generator fails or returns nothing usable.
pub const APOLOGY: &str = "I'm having a little trouble connecting to my thoughts right now. Try again?";

/// Spoken once when the user asks to leave.
pub const FAREWELL: &str = "It was good to speak with you. Take care.";

/// Containment match, so "stopwatch" also exits.
pub fn is_exit_intent(text: &str) -> bool {
    let lowered = text.to_lowercase();
    EXIT_WORDS.iter().any(|w| lowered.contains(w))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    Idle,
    AwaitingInput,
    Screening,
    /// The crisis reply is logged and waiting to be delivered.
    Crisis,
    Generating,
    Logging,
    Delivering,
    Terminated,
}

/// Source of user utterances. `None` means nothing usable was heard; the turn is skipped.
#[async_trait]
pub trait UtteranceSource: Send {
    async fn capture(&mut self) -> Option<String>;

    /// True once no further input can arrive (end of stream).
    fn is_closed(&self) -> bool {
        false
    }
}

/// Sink for replies. Errors are logged by the loop and never end the session.
#[async_trait]
pub trait ReplySink: Send {
    async fn deliver(&mut self, text: &str, pacing: PacingDecision) -> FeelioResult<()>;
}

/// The knobs the orchestrator reads from configuration.
#[derive(Debug, Clone)]
pub struct DialogueSettings {
    pub enable_safety_net: bool,
    pub pace_threshold: usize,
    pub session_max_entries: usize,
    /// `Some(dir)` writes the session record there at teardown.
    pub session_logs_path: Option<PathBuf>,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            enable_safety_net: true,
            pace_threshold: crate::pacing::DEFAULT_PACE_THRESHOLD,
            session_max_entries: crate::session::DEFAULT_MAX_ENTRIES,
            session_logs_path: None,
        }
    }
}

impl DialogueSettings {
    pub fn from_config(cfg: &FeelioConfig) -> Self {
        Self {
            enable_safety_net: cfg.enable_safety_net,
            pace_threshold: cfg.pace_threshold,
            session_max_entries: cfg.session_max_entries,
            session_logs_path: cfg.log_sessions.then(|| cfg.session_logs_path.clone()),
        }
    }
}

/// A reply ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReply {
    pub text: String,
    pub emotion: EmotionLabel,
    pub pacing: PacingDecision,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Exit intent; deliver the farewell and finalize. Nothing was logged.
    Exit { farewell: &'static str },
    /// Safety override; the crisis text was logged and the session continues.
    Crisis(TurnReply),
    Reply(TurnReply),
    /// The dialogue had already terminated; nothing was recorded.
    AlreadyEnded,
}

impl TurnOutcome {
    pub fn is_exit(&self) -> bool {
        matches!(self, TurnOutcome::Exit { .. })
    }

    pub fn is_crisis(&self) -> bool {
        matches!(self, TurnOutcome::Crisis(_))
    }

    pub fn is_already_ended(&self) -> bool {
        matches!(self, TurnOutcome::AlreadyEnded)
    }

    /// Text to deliver; empty for [`TurnOutcome::AlreadyEnded`].
    pub fn text(&self) -> &str {
        match self {
            TurnOutcome::Exit { farewell } => farewell,
            TurnOutcome::Crisis(r) | TurnOutcome::Reply(r) => &r.text,
            TurnOutcome::AlreadyEnded => "",
        }
    }

    pub fn pacing(&self) -> PacingDecision {
        match self {
            TurnOutcome::Exit { .. } | TurnOutcome::AlreadyEnded => PacingDecision::from_hint(PaceHint::Normal),
            TurnOutcome::Crisis(r) | TurnOutcome::Reply(r) => r.pacing,
        }
    }
}

/// What teardown produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSummary {
    pub turns: usize,
    pub summary: Option<String>,
    pub saved_to: Option<PathBuf>,
}

pub struct DialogueOrchestrator {
    history: EmotionHistory,
    log: SessionLog,
    generator: Arc<dyn TextGenerator>,
    settings: DialogueSettings,
    state: DialogueState,
}

impl DialogueOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: DialogueSettings) -> Self {
        Self {
            history: EmotionHistory::new(),
            log: SessionLog::new(settings.session_max_entries),
            generator,
            settings,
            state: DialogueState::Idle,
        }
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn history(&self) -> &EmotionHistory {
        &self.history
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn is_terminated(&self) -> bool {
        self.state == DialogueState::Terminated
    }

    /// Run one turn for an utterance already captured, with the emotion observed for it.
    ///
    /// Exit intent is checked before screening, so an utterance carrying both ends the dialogue.
    pub async fn process_turn(&mut self, user_text: &str, emotion: EmotionLabel) -> TurnOutcome {
        if self.is_terminated() {
            warn!(target: "feelio::dialogue", "turn refused, dialogue already ended");
            return TurnOutcome::AlreadyEnded;
        }
        self.state = DialogueState::AwaitingInput;

        if is_exit_intent(user_text) {
            if self.settings.enable_safety_net {
                let hits = safety::matched_phrases(user_text);
                if !hits.is_empty() {
                    warn!(target: "feelio::safety", phrases = hits.len(), "crisis language in a farewell, exiting without crisis reply");
                }
            }
            info!(target: "feelio::dialogue", "exit intent detected");
            self.state = DialogueState::Terminated;
            return TurnOutcome::Exit { farewell: FAREWELL };
        }

        self.history.record(emotion);

        self.state = DialogueState::Screening;
        if self.settings.enable_safety_net && safety::is_high_risk(user_text) {
            warn!(target: "feelio::dialogue", "crisis protocol activated");
            let text = safety::crisis_response().to_string();
            self.log.add_turn(user_text, text.clone(), emotion);
            self.state = DialogueState::Crisis;
            return TurnOutcome::Crisis(TurnReply {
                text,
                emotion,
                pacing: PacingDecision::crisis(),
            });
        }

        self.state = DialogueState::Generating;
        let pacing = PacingDecision::for_text(user_text, self.settings.pace_threshold);
        let prompt = build_fusion_prompt(
            user_text,
            emotion,
            &self.history.summarize(),
            &contradiction::detect(user_text, emotion),
            playbook::select(emotion, user_text),
            pacing.pace_hint,
        );
        debug!(target: "feelio::dialogue", %emotion, pace = %pacing.pace_hint, "fusion prompt built");

        let text = match self.generator.generate(&prompt).await.and_then(|r| clean_reply(&r)) {
            Ok(reply) => {
                info!(target: "feelio::dialogue", chars = reply.len(), "response generated");
                reply
            }
            Err(e) => {
                warn!(target: "feelio::dialogue", error = %e, "generation failed, using apology");
                APOLOGY.to_string()
            }
        };

        self.state = DialogueState::Logging;
        self.log.add_turn(user_text, text.clone(), emotion);
        self.state = DialogueState::Delivering;

        TurnOutcome::Reply(TurnReply {
            text,
            emotion,
            pacing,
        })
    }

    /// Drive the loop until exit intent, cancellation, or the capture source closes for good.
    ///
    /// `capture` returning `None` skips the turn. Set `cancel` to stop; an in-flight turn
    /// finishes first. Always finalizes.
    pub async fn run<C, D, E>(
        &mut self,
        capture: &mut C,
        delivery: &mut D,
        emotions: &E,
        cancel: Arc<AtomicBool>,
    ) -> SessionSummary
    where
        C: UtteranceSource + ?Sized,
        D: ReplySink + ?Sized,
        E: EmotionSource + ?Sized,
    {
        if self.is_terminated() {
            warn!(target: "feelio::dialogue", "run called on an ended dialogue");
            return SessionSummary {
                turns: self.log.len(),
                ..SessionSummary::default()
            };
        }
        info!(target: "feelio::dialogue", "session started");
        self.state = DialogueState::AwaitingInput;

        while !cancel.load(Ordering::SeqCst) {
            let Some(user_text) = capture.capture().await else {
                if capture.is_closed() {
                    info!(target: "feelio::dialogue", "input closed");
                    break;
                }
                continue;
            };
            if user_text.trim().is_empty() {
                continue;
            }

            let emotion = emotions.current();
            info!(target: "feelio::dialogue", %emotion, "emotion captured for response");

            let outcome = self.process_turn(&user_text, emotion).await;
            if let Err(e) = delivery.deliver(outcome.text(), outcome.pacing()).await {
                warn!(target: "feelio::dialogue", error = %e, "delivery failed");
            }
            if outcome.is_exit() || outcome.is_already_ended() {
                break;
            }
            self.state = DialogueState::AwaitingInput;
        }

        if cancel.load(Ordering::SeqCst) {
            info!(target: "feelio::dialogue", "cancellation received");
        }
        self.finalize().await
    }

    /// Teardown: summary (if anything was said) and the optional session record. Never fails.
    pub async fn finalize(&mut self) -> SessionSummary {
        self.state = DialogueState::Terminated;
        let turns = self.log.len();
        if turns == 0 {
            info!(target: "feelio::dialogue", "session ended with no conversation");
            return SessionSummary::default();
        }

        let prompt = build_summary_prompt(
            &self.log.emotion_timeline(DEFAULT_TIMELINE_COUNT),
            &self.log.recent_turns(DEFAULT_RECENT_TURNS),
        );
        let summary = match self.generator.generate(&prompt).await {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(target: "feelio::dialogue", error = %e, "could not generate summary");
                None
            }
        };

        let saved_to = self.settings.session_logs_path.as_deref().and_then(|dir| {
            match self.log.to_session_record().save_to_dir(dir) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(target: "feelio::session", error = %e, "failed to save session");
                    None
                }
            }
        });

        info!(target: "feelio::dialogue", turns, "session ended");
        SessionSummary {
            turns,
            summary,
            saved_to,
        }
    }
}
