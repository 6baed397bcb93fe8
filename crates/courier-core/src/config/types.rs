//! Configuration types for Courier
//!
//! Defines the structure of `.courier.toml` configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Language-model configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Chat transport configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Retry, timeout, and truncation settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Conversation settings
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Capability provider configurations
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
}

/// Language-model section (any OpenAI-compatible endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout: u64,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            timeout: default_request_timeout(),
        }
    }
}

/// Telegram transport section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Bot token (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Bot API base URL
    #[serde(default = "default_telegram_api")]
    pub api_base: String,

    /// Long-poll timeout in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: u64,

    /// Send an interim notice before running a task
    #[serde(default = "default_true")]
    pub processing_notice: bool,
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    25
}

fn default_true() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: default_telegram_api(),
            poll_timeout: default_poll_timeout(),
            processing_notice: true,
        }
    }
}

/// Pipeline section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum attempts per external call (including the first)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear delay step for transient failures, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Base of the exponential rate-limit backoff, in seconds
    #[serde(default = "default_rate_limit_base")]
    pub rate_limit_base: f64,

    /// Budget for one whole task path, in seconds
    #[serde(default = "default_task_timeout")]
    pub task_timeout_secs: u64,

    /// Maximum characters kept from one capability result
    #[serde(default = "default_max_result_chars")]
    pub max_result_chars: usize,

    /// Maximum characters of one outbound message
    #[serde(default = "default_transport_limit")]
    pub transport_limit: usize,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_rate_limit_base() -> f64 {
    1.5
}

fn default_task_timeout() -> u64 {
    120
}

fn default_max_result_chars() -> usize {
    1000
}

fn default_transport_limit() -> usize {
    4000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            rate_limit_base: default_rate_limit_base(),
            task_timeout_secs: default_task_timeout(),
            max_result_chars: default_max_result_chars(),
            transport_limit: default_transport_limit(),
        }
    }
}

impl PipelineConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

/// Dialogue section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// System turn every conversation starts with
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

pub(crate) fn default_system_prompt() -> String {
    "You are a helpful assistant. Maintain a natural conversational style.".to_string()
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
        }
    }
}

/// Capability provider sections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilitiesConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub source_control: SourceControlConfig,

    #[serde(default)]
    pub social: SocialConfig,

    #[serde(default)]
    pub messaging: MessagingConfig,
}

/// Web search (Tavily)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_search_url")]
    pub base_url: String,

    /// Number of results to include
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_search_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_max_results() -> usize {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_search_url(),
            max_results: default_max_results(),
        }
    }
}

/// Source control (GitHub issues)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceControlConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_github_url")]
    pub base_url: String,

    /// Repository owner (user or organization)
    #[serde(default)]
    pub owner: Option<String>,

    /// Repository receiving task issues
    #[serde(default = "default_repo")]
    pub repo: String,

    #[serde(default = "default_issue_title")]
    pub issue_title: String,
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

fn default_repo() -> String {
    "ai-agent-tasks".to_string()
}

fn default_issue_title() -> String {
    "AI Task".to_string()
}

impl Default for SourceControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: None,
            base_url: default_github_url(),
            owner: None,
            repo: default_repo(),
            issue_title: default_issue_title(),
        }
    }
}

/// Social posting (X/Twitter)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OAuth 2.0 user-context bearer token
    #[serde(default)]
    pub bearer_token: Option<String>,

    #[serde(default = "default_twitter_url")]
    pub base_url: String,
}

fn default_twitter_url() -> String {
    "https://api.twitter.com".to_string()
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bearer_token: None,
            base_url: default_twitter_url(),
        }
    }
}

/// Messaging (Telegram notification chat)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bot token; falls back to the transport token when absent
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat receiving notifications
    #[serde(default)]
    pub chat_id: Option<String>,

    #[serde(default = "default_telegram_api")]
    pub api_base: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: None,
            chat_id: None,
            api_base: default_telegram_api(),
        }
    }
}

fn has_value(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl SearchConfig {
    pub fn is_ready(&self) -> bool {
        self.enabled && has_value(&self.api_key)
    }
}

impl SourceControlConfig {
    pub fn is_ready(&self) -> bool {
        self.enabled && has_value(&self.token) && has_value(&self.owner)
    }
}

impl SocialConfig {
    pub fn is_ready(&self) -> bool {
        self.enabled && has_value(&self.bearer_token)
    }
}

impl MessagingConfig {
    pub fn is_ready(&self) -> bool {
        self.enabled && has_value(&self.bot_token) && has_value(&self.chat_id)
    }
}

impl CourierConfig {
    /// Bot token used by the chat transport
    pub fn bot_token(&self) -> crate::Result<&str> {
        self.transport
            .bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                crate::CourierError::config(
                    "no bot token configured (set TELEGRAM_BOT_TOKEN or [transport] bot_token)",
                )
            })
    }
}
