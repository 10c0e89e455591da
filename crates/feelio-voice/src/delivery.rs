//! Paced reply delivery: wait, print, optionally synthesize speech to disk.

use crate::error::VoiceError;
use crate::tts::{speed_for, TtsBackend};
use async_trait::async_trait;
use feelio_core::{FeelioResult, PacingDecision, ReplySink};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub struct SpokenDelivery<W> {
    out: W,
    speaker: String,
    tts: Option<(Arc<dyn TtsBackend>, PathBuf)>,
}

impl SpokenDelivery<std::io::Stdout> {
    pub fn console() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> SpokenDelivery<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            speaker: "Feelio".to_string(),
            tts: None,
        }
    }

    /// Also synthesize every reply, writing `response_<millis>.mp3` under `output_dir`.
    pub fn with_tts(mut self, tts: Arc<dyn TtsBackend>, output_dir: impl Into<PathBuf>) -> Self {
        self.tts = Some((tts, output_dir.into()));
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    async fn speak(tts: &dyn TtsBackend, dir: &Path, text: &str, pacing: PacingDecision) -> Result<Option<PathBuf>, VoiceError> {
        let audio = tts.synthesize(text, speed_for(pacing.pace_hint)).await?;
        if audio.is_empty() {
            return Ok(None);
        }
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("response_{}.mp3", chrono::Utc::now().timestamp_millis()));
        tokio::fs::write(&path, audio).await?;
        Ok(Some(path))
    }
}

#[async_trait]
impl<W: Write + Send> ReplySink for SpokenDelivery<W> {
    async fn deliver(&mut self, text: &str, pacing: PacingDecision) -> FeelioResult<()> {
        tokio::time::sleep(pacing.pre_pause()).await;

        writeln!(self.out, "{}: {}", self.speaker, text)
            .and_then(|_| self.out.flush())
            .map_err(VoiceError::from)?;
        debug!(target: "feelio::voice", pace = %pacing.pace_hint, "reply delivered");

        if let Some((tts, dir)) = &self.tts {
            if let Some(path) = Self::speak(tts.as_ref(), dir, text, pacing).await? {
                info!(target: "feelio::voice", path = %path.display(), "speech written");
            }
        }
        Ok(())
    }
}
