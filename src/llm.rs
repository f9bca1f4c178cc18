use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::LlmSettings;

const COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A chat-completion backend. The forge only ever needs one reply per request.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, messages: &[Message]) -> Result<String>;
}

/// OpenAI-compatible chat completions client.
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `LLM_BASE_URL` may name the host, the `/v1` root, or the full
    /// completions path.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with(COMPLETIONS_PATH) {
            return base.to_string();
        }
        let version = if base.ends_with("/v1") { "" } else { "/v1" };
        format!("{}{}{}", base, version, COMPLETIONS_PATH)
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    /// Non-streaming chat completion.
    async fn chat(&self, messages: &[Message]) -> Result<String> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(temperature) = self.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.send().await.context("LLM request failed")?;
        let status = resp.status();
        let text = resp.text().await.context("Failed to read LLM response")?;
        if !status.is_success() {
            let snippet: String = text.chars().take(500).collect();
            anyhow::bail!("LLM service returned {}: {}", status, snippet);
        }

        let json: serde_json::Value =
            serde_json::from_str(&text).context("Failed to parse LLM JSON")?;
        let content = extract_content(&json);
        debug!(
            model = %self.model,
            messages = messages.len(),
            response_len = content.len(),
            "chat completion finished"
        );
        Ok(content)
    }
}

/// Pull `choices[0].message.content`, treating null or absent as empty.
fn extract_content(json: &serde_json::Value) -> String {
    json["choices"]
        .get(0)
        .and_then(|c| c["message"]["content"].as_str())
        .unwrap_or("")
        .to_string()
}
