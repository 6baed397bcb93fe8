//! Orchestration types for the task pipeline

use crate::capabilities::Capability;
use crate::llm::ChatMessage;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Summary used when the model response could not be decoded
pub const ANALYSIS_FAILED: &str = "analysis failed";

/// Reply when no capability produced an outcome
pub const NO_ACTION_MESSAGE: &str = "⚠️ No action was taken.";

/// Reply to a reset command
pub const RESET_CONFIRMATION: &str = "Conversation history has been cleared.";

/// One message in a user's history
pub type Turn = ChatMessage;

/// Opaque user identity supplied by the transport
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One pipeline run's input
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub id: Uuid,
    pub user_id: UserId,
    pub text: String,
}

impl TaskRequest {
    pub fn new(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            text: text.into(),
        }
    }
}

/// Capabilities the planner decided a task needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityPlan {
    /// Requested capabilities, deduplicated, in model order
    pub capabilities: Vec<Capability>,
    /// Human-readable summary from the model
    pub summary: String,
}

impl CapabilityPlan {
    /// Plan with no capabilities
    pub fn empty(summary: impl Into<String>) -> Self {
        Self {
            capabilities: Vec::new(),
            summary: summary.into(),
        }
    }

    /// Sentinel returned whenever planning fails
    pub fn analysis_failed() -> Self {
        Self::empty(ANALYSIS_FAILED)
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

/// Recorded result of invoking one capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationOutcome {
    pub capability: Capability,
    pub succeeded: bool,
    /// Result text on success, error description on failure
    pub text: String,
}

impl InvocationOutcome {
    pub fn success(capability: Capability, text: impl Into<String>) -> Self {
        Self {
            capability,
            succeeded: true,
            text: text.into(),
        }
    }

    pub fn failure(capability: Capability, error: impl Into<String>) -> Self {
        Self {
            capability,
            succeeded: false,
            text: error.into(),
        }
    }
}
