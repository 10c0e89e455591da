//! Feelio configuration: defaults, optional TOML file, then `FEELIO_*` environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | FEELIO_CONFIG | config/feelio.toml | Optional TOML file layered over the defaults. |
//! | FEELIO_LLM_MODE | live | `live` (OpenAI-compatible API) or `mock` (offline canned replies). |
//! | FEELIO_API_KEY / OPENROUTER_API_KEY | unset | Required in live mode. |
//! | FEELIO_MODEL_NAME | meta-llama/llama-3.3-70b-instruct | Chat model. |
//! | FEELIO_ENABLE_SAFETY_NET | true | Crisis override on high-risk language. |
//! | FEELIO_LOG_SESSIONS | false | Write `session_<ts>.json` at teardown. |
//! | FEELIO_PACE_THRESHOLD | 18 | Words above which replies slow down. |
//! | FEELIO_SESSION_IDLE_TIMEOUT_SECS | 1800 | Gateway sessions idle this long are finalized. |

use crate::error::{FeelioError, FeelioResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    #[default]
    Live,
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeelioConfig {
    pub app_env: String,
    pub log_level: String,
    /// Second log sink; empty disables the file.
    pub log_file: String,
    pub llm_mode: LlmMode,
    #[serde(default)]
    pub api_key: Option<String>,
    pub api_base: String,
    pub model_name: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
    pub enable_safety_net: bool,
    pub log_sessions: bool,
    pub session_logs_path: PathBuf,
    pub session_max_entries: usize,
    pub pace_threshold: usize,
    pub speech_timeout_secs: u64,
    pub tts_enabled: bool,
    pub tts_api_base: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub tts_output_dir: PathBuf,
    pub bind_addr: String,
    pub session_idle_timeout_secs: u64,
}

impl Default for FeelioConfig {
    fn default() -> Self {
        Self {
            app_env: "development".to_string(),
            log_level: "info".to_string(),
            log_file: "feelio.log".to_string(),
            llm_mode: LlmMode::Live,
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            temperature: 0.9,
            top_p: 0.95,
            max_output_tokens: 1024,
            request_timeout_secs: 60,
            enable_safety_net: true,
            log_sessions: false,
            session_logs_path: PathBuf::from("./session_logs"),
            session_max_entries: crate::session::DEFAULT_MAX_ENTRIES,
            pace_threshold: crate::pacing::DEFAULT_PACE_THRESHOLD,
            speech_timeout_secs: 5,
            tts_enabled: false,
            tts_api_base: "https://api.openai.com/v1".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "shimmer".to_string(),
            tts_output_dir: PathBuf::from("./tts_out"),
            bind_addr: "127.0.0.1:8000".to_string(),
            session_idle_timeout_secs: 1800,
        }
    }
}

impl FeelioConfig {
    /// Load with precedence: `FEELIO_*` env > file at `FEELIO_CONFIG` (or `config/feelio.toml`)
    /// > defaults. Does not validate; call [`FeelioConfig::validate`] before use.
    pub fn load() -> FeelioResult<Self> {
        let path = std::env::var("FEELIO_CONFIG").unwrap_or_else(|_| "config/feelio.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> FeelioResult<Self> {
        let defaults = config::Config::try_from(&FeelioConfig::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        }
        let built = builder
            .add_source(
                config::Environment::with_prefix("FEELIO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: FeelioConfig = built.try_deserialize()?;
        if cfg.api_key.as_deref().map(str::trim).unwrap_or("").is_empty() {
            cfg.api_key = std::env::var("OPENROUTER_API_KEY").ok();
        }
        cfg.api_key = cfg
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Ok(cfg)
    }

    /// Reject settings the process cannot start with.
    pub fn validate(&self) -> FeelioResult<()> {
        if self.llm_mode == LlmMode::Live && self.api_key.is_none() {
            return Err(FeelioError::Config(
                "API key is not set. Set FEELIO_API_KEY or OPENROUTER_API_KEY (or FEELIO_LLM_MODE=mock)."
                    .to_string(),
            ));
        }
        if self.session_max_entries == 0 {
            return Err(FeelioError::Config("session_max_entries must be > 0".to_string()));
        }
        if self.speech_timeout_secs == 0 {
            return Err(FeelioError::Config("speech_timeout_secs must be > 0".to_string()));
        }
        if self.session_idle_timeout_secs == 0 {
            return Err(FeelioError::Config("session_idle_timeout_secs must be > 0".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(FeelioError::Config("temperature must be within [0, 2]".to_string()));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(FeelioError::Config("top_p must be within (0, 1]".to_string()));
        }
        info!(target: "feelio::config", env = %self.app_env, "configuration validated");
        Ok(())
    }

    /// Copy safe to log or serve: the API key is redacted.
    pub fn masked(&self) -> Self {
        let mut out = self.clone();
        out.api_key = Some(
            if self.api_key.is_some() { "***REDACTED***" } else { "NOT_SET" }.to_string(),
        );
        out
    }

    /// Masked configuration as TOML, for `--print-config`.
    pub fn to_masked_toml(&self) -> FeelioResult<String> {
        toml::to_string_pretty(&self.masked()).map_err(|e| FeelioError::Config(e.to_string()))
    }
}
