//! Courier Core - task orchestration library for Courier
//!
//! This crate provides the transport-agnostic pipeline:
//! - Conversation store (per-user history)
//! - Planner, capability router and summarizer
//! - Retry executor with rate-limit backoff
//! - Capability providers (search, source control, social, messaging)
//! - Configuration loading
//!
//! Any chat front end can drive it through [`ChatTransport`] and the
//! [`DialogueController`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  Inbound   ┌────────────┐  plan   ┌──────────────────┐
//! │ ChatTransport│ ─────────→ │ Dispatcher │ ──────→ │ DialogueController│
//! │  (Telegram)  │ ←───────── │ (per user) │ ←────── │ Planner → Router │
//! └──────────────┘   reply    └────────────┘  reply  │   → Summarizer   │
//!                                                    └──────────────────┘
//! ```

pub mod capabilities;
pub mod commands;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestration;
pub mod provider;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use error::{CourierError, Result};
pub use provider::{FailureClass, ProviderError};

// Re-export config types
pub use config::{load_config, CourierConfig, LlmConfig, PipelineConfig};

// Re-export LLM types
pub use llm::{ChatMessage, LanguageModel, OpenAIModel, Role, SharedModel};

// Re-export capability types
pub use capabilities::{
    Capability, CapabilityProvider, CapabilityRegistry, GitHubIssues, SharedCapability,
    TavilySearch, TelegramNotifier, TwitterPoster,
};

// Re-export orchestration types
pub use orchestration::{
    CapabilityPlan, CapabilityRouter, ConversationStore, DialogueController, Dispatcher,
    InvocationOutcome, Planner, RetryExecutor, RetryPolicy, Summarizer, UserId,
};

// Re-export transport types
pub use transport::{ChatTransport, ConversationId, Inbound, TransportError};

/// Get the crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
