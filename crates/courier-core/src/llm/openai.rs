//! OpenAI-compatible LLM provider
//!
//! Connects to any `/chat/completions` endpoint for non-streaming completions.

use super::{ChatMessage, LanguageModel};
use crate::config::LlmConfig;
use crate::provider::run_blocking;
use crate::ProviderError;
use async_trait::async_trait;
use std::time::Duration;

/// OpenAI-compatible provider
pub struct OpenAIModel {
    /// API key
    api_key: String,

    /// Base URL for the API (supports OpenAI-compatible APIs)
    base_url: String,

    /// Model identifier
    model: String,

    temperature: f32,

    /// HTTP client for API calls
    client: ureq::Agent,
}

impl OpenAIModel {
    /// Create a new provider against the default OpenAI endpoint
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.to_string(),
            temperature: 0.7,
            client: ureq::Agent::new(),
        }
    }

    /// Create from the `[llm]` config section
    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::not_configured("llm.api_key is not set"))?;

        let client = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout))
            .build();

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            client,
        })
    }

    /// Create with a specific base URL (for OpenAI-compatible APIs like Azure, local proxies)
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl LanguageModel for OpenAIModel {
    fn id(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages.iter().map(ChatMessage::to_json).collect::<Vec<_>>(),
            "temperature": self.temperature,
        });
        let url = format!("{}/chat/completions", self.base_url);
        let auth = format!("Bearer {}", self.api_key);
        let client = self.client.clone();

        run_blocking(move || {
            let response = client
                .post(&url)
                .set("Content-Type", "application/json")
                .set("Authorization", &auth)
                .send_json(&body)?;
            let json: serde_json::Value = response.into_json()?;
            extract_completion(&json)
        })
        .await
    }
}

/// Pull the assistant text out of a chat-completions response
fn extract_completion(json: &serde_json::Value) -> Result<String, ProviderError> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(ProviderError::Api {
            status: 500,
            message: message.to_string(),
        });
    }

    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ProviderError::internal("Invalid chat completion response"))
}
