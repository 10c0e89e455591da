//! Text-to-speech backends.
//!
//! The production backend talks to any OpenAI-compatible `/audio/speech` endpoint. Playback
//! devices are not handled here; synthesized audio is handed back as bytes.

use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use feelio_core::{FeelioConfig, PaceHint};
use std::time::Duration;
use tracing::debug;

/// Speaking rate for `slower` replies.
pub const SLOW_SPEED: f32 = 0.85;
pub const NORMAL_SPEED: f32 = 1.0;

pub fn speed_for(hint: PaceHint) -> f32 {
    if hint.is_slower() {
        SLOW_SPEED
    } else {
        NORMAL_SPEED
    }
}

/// Turns text into audio bytes (MP3). Return an empty vec to skip output.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    async fn synthesize(&self, text: &str, speed: f32) -> VoiceResult<Vec<u8>>;
}

/// Produces no audio. Used when TTS is disabled or unconfigured.
#[derive(Debug, Default)]
pub struct PlaceholderTts;

#[async_trait]
impl TtsBackend for PlaceholderTts {
    async fn synthesize(&self, _text: &str, _speed: f32) -> VoiceResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// OpenAI-compatible TTS (OpenAI, OpenRouter, local servers).
#[derive(Debug, Clone)]
pub struct OpenRouterTts {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    pub api_key: String,
    /// tts-1 (fast) or tts-1-hd.
    pub model: String,
    pub voice: String,
    client: reqwest::Client,
}

impl OpenRouterTts {
    /// Endpoint, model and voice from configuration; the key falls back to the environment.
    pub fn from_config(cfg: &FeelioConfig) -> VoiceResult<Self> {
        let api_key = match std::env::var("TTS_API_KEY") {
            Ok(k) if !k.trim().is_empty() => k,
            _ => cfg
                .api_key
                .clone()
                .ok_or_else(|| VoiceError::Config("TTS enabled but no API key is set".to_string()))?,
        };
        Ok(Self::new(cfg.tts_api_base.clone(), api_key, cfg.tts_model.clone())?.with_voice(cfg.tts_voice.clone()))
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into().trim().to_string(),
            model: model.into(),
            voice: "shimmer".to_string(),
            client,
        })
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    fn request_body(&self, text: &str, speed: f32) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "speed": speed,
        })
    }
}

#[async_trait]
impl TtsBackend for OpenRouterTts {
    async fn synthesize(&self, text: &str, speed: f32) -> VoiceResult<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/audio/speech", self.base_url);
        debug!(target: "feelio::voice", voice = %self.voice, speed, "tts request");
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text, speed))
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!("TTS API error {}: {}", status, body)));
        }
        Ok(res.bytes().await?.to_vec())
    }
}
