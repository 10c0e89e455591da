//! Error types for the Feelio core.

use thiserror::Error;

/// Result type alias for core operations.
pub type FeelioResult<T> = Result<T, FeelioError>;

/// How the dialogue loop should treat an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Recovered inside the turn (substitute reply, skipped turn, logged warning).
    Transient,
    /// Stops start-up; reported to the operator.
    Fatal,
}

#[derive(Error, Debug)]
pub enum FeelioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Frame decode error: {0}")]
    FrameDecode(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FeelioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeelioError::Config(_) => ErrorKind::Fatal,
            _ => ErrorKind::Transient,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

impl From<config::ConfigError> for FeelioError {
    fn from(err: config::ConfigError) -> Self {
        FeelioError::Config(err.to_string())
    }
}
