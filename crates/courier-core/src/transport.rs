//! Chat transport abstraction
//!
//! The pipeline only sees [`Inbound`] messages and sends plain text back to a
//! conversation. The Telegram implementation lives in the binary.

use crate::orchestration::UserId;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Where replies for a message go (a Telegram chat id)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One inbound text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub text: String,
}

impl Inbound {
    pub fn new(
        user_id: impl Into<UserId>,
        conversation_id: impl Into<ConversationId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            conversation_id: conversation_id.into(),
            text: text.into(),
        }
    }
}

/// Transport failures
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network or HTTP failure
    #[error("Transport request failed: {0}")]
    Http(String),

    /// The chat API answered with an error
    #[error("Chat API error ({code}): {description}")]
    Api { code: u16, description: String },

    /// Unexpected response body
    #[error("Could not decode transport response: {0}")]
    Decode(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => TransportError::Api {
                code,
                description: response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string()),
            },
            ureq::Error::Transport(transport) => TransportError::Http(transport.to_string()),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// Chat transport trait
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Wait for the next batch of messages (may be empty)
    async fn receive(&self) -> Result<Vec<Inbound>, TransportError>;

    /// Send a text message to a conversation
    async fn send(&self, conversation: &ConversationId, text: &str) -> Result<(), TransportError>;
}
