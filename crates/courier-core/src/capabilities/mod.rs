//! Capability providers
//!
//! A capability is a named external action class the planner can request.
//! Each one has exactly one provider implementing [`CapabilityProvider`]:
//! - Search (Tavily)
//! - Source control (GitHub issues)
//! - Social (X/Twitter posts)
//! - Messaging (Telegram notifications)

mod messaging;
mod registry;
mod search;
mod social;
mod source_control;

pub use messaging::TelegramNotifier;
pub use registry::CapabilityRegistry;
pub use search::TavilySearch;
pub use social::TwitterPoster;
pub use source_control::GitHubIssues;

use crate::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Statically known capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Search,
    SourceControl,
    Social,
    Messaging,
}

impl Capability {
    /// Every capability, in prompt order
    pub const ALL: [Capability; 4] = [
        Capability::Search,
        Capability::SourceControl,
        Capability::Social,
        Capability::Messaging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Search => "search",
            Capability::SourceControl => "source_control",
            Capability::Social => "social",
            Capability::Messaging => "messaging",
        }
    }

    /// One-line description used in the planner prompt
    pub fn description(&self) -> &'static str {
        match self {
            Capability::Search => "look up current information on the web",
            Capability::SourceControl => "open an issue in the team's task repository",
            Capability::Social => "publish a short public post",
            Capability::Messaging => "send a notification to the team chat",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "search" | "web_search" | "tavily" => Ok(Capability::Search),
            "source_control" | "github" | "git" => Ok(Capability::SourceControl),
            "social" | "twitter" | "x" => Ok(Capability::Social),
            "messaging" | "telegram" | "notify" => Ok(Capability::Messaging),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}

/// Capability provider trait
///
/// `invoke` receives the full task text and returns a result text for
/// the user. Failures are classified (see [`ProviderError::class`]).
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Capability this provider implements
    fn capability(&self) -> Capability;

    /// Perform the action for a task
    async fn invoke(&self, task: &str) -> Result<String, ProviderError>;
}

/// Shared handle to a capability provider
pub type SharedCapability = Arc<dyn CapabilityProvider>;

/// Reject empty tasks before any network call
pub(crate) fn require_task(task: &str) -> Result<&str, ProviderError> {
    let task = task.trim();
    if task.is_empty() {
        Err(ProviderError::InvalidRequest("task text is empty".to_string()))
    } else {
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for capability in Capability::ALL {
            assert_eq!(capability.as_str().parse::<Capability>(), Ok(capability));
        }
    }

    #[test]
    fn test_parse_vendor_aliases() {
        assert_eq!("Tavily".parse(), Ok(Capability::Search));
        assert_eq!("github".parse(), Ok(Capability::SourceControl));
        assert_eq!("twitter".parse(), Ok(Capability::Social));
        assert_eq!("telegram".parse(), Ok(Capability::Messaging));
        assert_eq!("source-control".parse(), Ok(Capability::SourceControl));
    }

    #[test]
    fn test_parse_unknown() {
        assert!("calendar".parse::<Capability>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Capability::SourceControl).unwrap();
        assert_eq!(json, "\"source_control\"");
    }

    #[test]
    fn test_require_task() {
        assert_eq!(require_task("  post this  "), Ok("post this"));
        assert!(matches!(
            require_task("   "),
            Err(ProviderError::InvalidRequest(_))
        ));
    }
}
