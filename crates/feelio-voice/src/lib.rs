//! # Feelio Voice
//!
//! Terminal-side adapters for the dialogue loop: line capture with a timeout, paced delivery,
//! and optional speech synthesis through an OpenAI-compatible endpoint.
//!
//! ```text
//! stdin ──▶ LineCapture ──▶ DialogueOrchestrator ──▶ SpokenDelivery ──▶ stdout
//!                                                        └──▶ TtsBackend ──▶ response_<ms>.mp3
//! ```

pub mod capture;
pub mod delivery;
pub mod error;
pub mod tts;

pub use capture::{ConsoleCapture, LineCapture};
pub use delivery::SpokenDelivery;
pub use error::{VoiceError, VoiceResult};
pub use tts::{speed_for, OpenRouterTts, PlaceholderTts, TtsBackend, NORMAL_SPEED, SLOW_SPEED};
