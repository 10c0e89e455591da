//! Error types for the Feelio voice adapters

use feelio_core::FeelioError;
use thiserror::Error;

/// Result type alias for voice operations
pub type VoiceResult<T> = Result<T, VoiceError>;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        VoiceError::Tts(err.to_string())
    }
}

impl From<VoiceError> for FeelioError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Config(msg) => FeelioError::Config(msg),
            other => FeelioError::Delivery(other.to_string()),
        }
    }
}
