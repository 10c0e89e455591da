//! Reply generation: an OpenAI-compatible chat-completions client and an offline mock.
//!
//! Every request carries the therapist persona as the system message. Replies are cleaned
//! (markdown asterisks stripped, whitespace trimmed) before anything downstream sees them.

use crate::config::{FeelioConfig, LlmMode};
use crate::error::{FeelioError, FeelioResult};
use crate::prompts::THERAPIST_PERSONA;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// External text generator. Implementations must be safe to share across sessions.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> FeelioResult<String>;

    fn name(&self) -> &str {
        "generator"
    }
}

/// Strip markdown emphasis and surrounding whitespace; an empty result is a failure.
pub fn clean_reply(raw: &str) -> FeelioResult<String> {
    let cleaned = raw.replace('*', "").trim().to_string();
    if cleaned.is_empty() {
        return Err(FeelioError::Generation("empty reply".to_string()));
    }
    Ok(cleaned)
}

/// Build the generator selected by `llm_mode`.
pub fn from_config(cfg: &FeelioConfig) -> FeelioResult<Arc<dyn TextGenerator>> {
    match cfg.llm_mode {
        LlmMode::Mock => Ok(Arc::new(MockGenerator)),
        LlmMode::Live => {
            let key = cfg
                .api_key
                .clone()
                .ok_or_else(|| FeelioError::Config("API key is not set".to_string()))?;
            Ok(Arc::new(OpenRouterGenerator::from_config(key, cfg)))
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client (OpenRouter by default). Stateless: each prompt is self-contained.
pub struct OpenRouterGenerator {
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenRouterGenerator {
    pub fn from_config(api_key: String, cfg: &FeelioConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs.max(1)))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            model: cfg.model_name.clone(),
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_output_tokens,
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenRouterGenerator {
    async fn generate(&self, prompt: &str) -> FeelioResult<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: THERAPIST_PERSONA.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            max_tokens: Some(self.max_tokens),
        };

        debug!(target: "feelio::generator", model = %self.model, prompt_chars = prompt.len(), "chat request");

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Title", "Feelio")
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            warn!(target: "feelio::generator", %status, "chat API returned an error");
            return Err(FeelioError::Generation(format!("API error {}: {}", status, text)));
        }

        let parsed: ChatResponse = res.json().await?;
        let raw = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| FeelioError::Generation("no choices in response".to_string()))?;
        clean_reply(&raw)
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

/// Offline generator for `llm_mode = mock`: echoes the suggested playbook line from the prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGenerator;

impl MockGenerator {
    fn playbook_line(prompt: &str) -> Option<&str> {
        let start = prompt.find("SUGGESTED PLAYBOOK: ")? + "SUGGESTED PLAYBOOK: ".len();
        let rest = &prompt[start..];
        let end = rest.find(". PACE HINT:").unwrap_or(rest.len());
        Some(rest[..end].trim())
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> FeelioResult<String> {
        let reply = if prompt.contains("Recent emotions:") {
            "- Emotion trend: noted across the session.\n- Key concerns: shared in your own words.\n- Small actions: one step at a time.".to_string()
        } else {
            match Self::playbook_line(prompt) {
                Some(line) => format!("Thank you for telling me that. {}", line),
                None => "Thank you for telling me that. Let's take one small step together.".to_string(),
            }
        };
        clean_reply(&reply)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
