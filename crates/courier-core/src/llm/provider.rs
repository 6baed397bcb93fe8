//! Language-model trait

use super::ChatMessage;
use crate::ProviderError;
use async_trait::async_trait;
use std::sync::Arc;

/// Language-model capability
///
/// One call sends an ordered conversation and returns the full completion
/// text. Failures are classified so the retry executor can back off on rate
/// limits.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Identifier used in logs (e.g., "openai")
    fn id(&self) -> &str;

    /// Currently configured model name
    fn model(&self) -> &str;

    /// Complete the conversation
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}

/// Shared handle to a language model
pub type SharedModel = Arc<dyn LanguageModel>;
