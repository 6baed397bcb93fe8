//! Planner
//!
//! Asks the language model which capabilities a task needs and turns the
//! reply into a [`CapabilityPlan`]. Planning never fails: any problem yields
//! the "analysis failed" plan.

use super::retry::RetryExecutor;
use super::types::CapabilityPlan;
use crate::capabilities::{Capability, CapabilityRegistry};
use crate::llm::{ChatMessage, SharedModel};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

const PLANNER_SYSTEM_PROMPT: &str = r#"
You are the planner of a task assistant.
Your goal is to analyze the user's task and decide which tools are needed to carry it out.

The tools at your disposal are:
{tools}

**Output Format:**
You must respond with a strict JSON object (no markdown formatting) in the following format:
{
  "summary": "Short description of what will be done",
  "tools": ["tool name", ...]
}

Only use tool names from the list above. If no tool is needed, return an empty "tools" list.
"#;

/// Raw planner reply, decoded strictly
#[derive(Debug, Deserialize)]
struct PlanReply {
    #[serde(default)]
    summary: String,
    tools: Vec<String>,
}

/// Capability planner
pub struct Planner {
    model: SharedModel,
    executor: RetryExecutor,
}

impl Planner {
    pub fn new(model: SharedModel, executor: RetryExecutor) -> Self {
        Self { model, executor }
    }

    /// Decide which registered capabilities `task` needs
    pub async fn plan(&self, task: &str, registry: &CapabilityRegistry) -> CapabilityPlan {
        let available = registry.capabilities();
        if available.is_empty() {
            tracing::debug!("no capabilities registered, skipping planner");
            return CapabilityPlan::empty("no capabilities available");
        }

        let messages = build_planner_messages(task, &available);
        let reply = match self
            .executor
            .run("planner", || self.model.complete(&messages))
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(model = self.model.model(), error = %err, "planner call failed");
                return CapabilityPlan::analysis_failed();
            }
        };

        let plan = parse_plan(&reply, &available);
        tracing::info!(
            capabilities = ?plan.capabilities,
            summary = %plan.summary,
            "task planned"
        );
        plan
    }
}

/// Build the planner request for a task
pub fn build_planner_messages(task: &str, available: &[Capability]) -> Vec<ChatMessage> {
    let tools = available
        .iter()
        .map(|c| format!("- **{}**: {}", c.as_str(), c.description()))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = PLANNER_SYSTEM_PROMPT.replace("{tools}", &tools);
    vec![ChatMessage::system(prompt.trim()), ChatMessage::user(task)]
}

/// Parse a planner reply, keeping only names found in `available`
pub fn parse_plan(content: &str, available: &[Capability]) -> CapabilityPlan {
    let cleaned = strip_reasoning(content);
    let cleaned = cleaned
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let reply: PlanReply = match serde_json::from_str(cleaned) {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!(error = %err, "could not decode planner reply");
            return CapabilityPlan::analysis_failed();
        }
    };

    let mut capabilities = Vec::with_capacity(reply.tools.len());
    for name in &reply.tools {
        match name.parse::<Capability>() {
            Ok(capability) if available.contains(&capability) => {
                if !capabilities.contains(&capability) {
                    capabilities.push(capability);
                }
            }
            Ok(capability) => {
                tracing::warn!(%capability, "planner chose an unregistered capability");
            }
            Err(_) => {
                tracing::warn!(name = %name, "planner chose an unknown capability");
            }
        }
    }

    CapabilityPlan {
        capabilities,
        summary: reply.summary,
    }
}

/// Remove every `<think>...</think>` block
pub fn strip_reasoning(content: &str) -> String {
    static THINK: OnceLock<Option<Regex>> = OnceLock::new();
    match THINK.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").ok()) {
        Some(re) => re.replace_all(content, "").into_owned(),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::retry::RetryPolicy;
    use crate::orchestration::types::ANALYSIS_FAILED;
    use crate::testing::{FakeCapability, FakeModel};
    use crate::ProviderError;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    const ALL: &[Capability] = &Capability::ALL;

    fn registry(capabilities: &[Capability]) -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        for &capability in capabilities {
            registry.register(Arc::new(FakeCapability::ok(capability, "done")));
        }
        registry
    }

    fn executor() -> RetryExecutor {
        RetryExecutor::new(RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::from_millis(10),
            rate_limit_base: 1.5,
        })
    }

    #[test]
    fn test_parse_valid_reply() {
        let plan = parse_plan(r#"{"summary": "Web lookup", "tools": ["search"]}"#, ALL);
        assert_eq!(plan.capabilities, vec![Capability::Search]);
        assert_eq!(plan.summary, "Web lookup");
    }

    #[test]
    fn test_parse_with_think_block_and_fences() {
        let reply = "<think>\nThe user wants weather.\nUse search.\n</think>\n```json\n{\"summary\": \"Weather\", \"tools\": [\"search\", \"messaging\"]}\n```";
        let plan = parse_plan(reply, ALL);
        assert_eq!(
            plan.capabilities,
            vec![Capability::Search, Capability::Messaging]
        );
    }

    #[test]
    fn test_parse_malformed_reply() {
        let plan = parse_plan("I think you should search the web.", ALL);
        assert_eq!(plan, CapabilityPlan::analysis_failed());
    }

    #[test]
    fn test_parse_missing_tools() {
        let plan = parse_plan(r#"{"summary": "nothing"}"#, ALL);
        assert_eq!(plan.summary, ANALYSIS_FAILED);
    }

    #[test]
    fn test_parse_tools_without_summary() {
        let plan = parse_plan(r#"{"tools": ["search"]}"#, ALL);
        assert_eq!(plan.capabilities, vec![Capability::Search]);
        assert_eq!(plan.summary, "");
    }

    #[test]
    fn test_parse_aliases_and_duplicates() {
        let plan = parse_plan(
            r#"{"summary": "s", "tools": ["github", "source_control", "Tavily", "search"]}"#,
            ALL,
        );
        assert_eq!(
            plan.capabilities,
            vec![Capability::SourceControl, Capability::Search]
        );
    }

    #[test]
    fn test_parse_drops_unknown_and_unregistered() {
        let plan = parse_plan(
            r#"{"summary": "s", "tools": ["calendar", "social", "search"]}"#,
            &[Capability::Search],
        );
        assert_eq!(plan.capabilities, vec![Capability::Search]);
    }

    #[test]
    fn test_strip_reasoning_multiple_blocks() {
        assert_eq!(
            strip_reasoning("<think>a</think>x<think>\nb\n</think>y"),
            "xy"
        );
        assert_eq!(strip_reasoning("plain"), "plain");
    }

    #[test]
    fn test_prompt_lists_registered_capabilities() {
        let messages = build_planner_messages("post it", &[Capability::Social]);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("social"));
        assert!(!messages[0].content.contains("source_control"));
        assert_eq!(messages[1], ChatMessage::user("post it"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_plan_uses_model_reply() {
        let model = Arc::new(FakeModel::replying(
            r#"{"summary": "Weather lookup", "tools": ["search"]}"#,
        ));
        let planner = Planner::new(model.clone(), executor());
        let plan = planner
            .plan("find today's weather", &registry(&[Capability::Search]))
            .await;
        assert_eq!(plan.capabilities, vec![Capability::Search]);
        assert_eq!(model.calls(), 1);
        assert_eq!(
            model.requests()[0][1],
            ChatMessage::user("find today's weather")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_plan_retries_rate_limited_model() {
        let model = Arc::new(FakeModel::script(vec![
            Err(ProviderError::RateLimited { retry_after: None }),
            Ok(r#"{"summary": "s", "tools": ["messaging"]}"#.to_string()),
        ]));
        let planner = Planner::new(model.clone(), executor());
        let plan = planner
            .plan("notify the team", &registry(&[Capability::Messaging]))
            .await;
        assert_eq!(plan.capabilities, vec![Capability::Messaging]);
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_plan_model_failure_gives_sentinel() {
        let model = Arc::new(FakeModel::failing(ProviderError::Unauthorized(
            "bad key".into(),
        )));
        let planner = Planner::new(model.clone(), executor());
        let plan = planner.plan("anything", &registry(ALL)).await;
        assert_eq!(plan, CapabilityPlan::analysis_failed());
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_plan_with_empty_registry_skips_model() {
        let model = Arc::new(FakeModel::replying("unused"));
        let planner = Planner::new(model.clone(), executor());
        let plan = planner.plan("anything", &CapabilityRegistry::new()).await;
        assert!(plan.is_empty());
        assert_eq!(model.calls(), 0);
    }
}
