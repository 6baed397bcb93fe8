//! LLM integration module
//!
//! Provides the language-model contract the planner talks to and an
//! implementation for OpenAI-compatible chat-completions endpoints
//! (OpenAI, DeepSeek, OpenRouter, local proxies).

mod message;
mod openai;
mod provider;

pub use message::{ChatMessage, Role};
pub use openai::OpenAIModel;
pub use provider::{LanguageModel, SharedModel};
