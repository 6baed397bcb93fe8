//! Web search capability backed by Tavily

use super::{require_task, Capability, CapabilityProvider};
use crate::config::SearchConfig;
use crate::provider::run_blocking;
use crate::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;

/// Tavily search provider
pub struct TavilySearch {
    api_key: String,
    base_url: String,
    max_results: usize,
    client: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    pub fn from_config(config: &SearchConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results.max(1),
            client: ureq::Agent::new(),
        })
    }
}

#[async_trait]
impl CapabilityProvider for TavilySearch {
    fn capability(&self) -> Capability {
        Capability::Search
    }

    async fn invoke(&self, task: &str) -> Result<String, ProviderError> {
        let query = require_task(task)?.to_string();
        let url = format!("{}/search", self.base_url);
        let auth = format!("Bearer {}", self.api_key);
        let max_results = self.max_results;
        let client = self.client.clone();

        tracing::debug!(%query, "searching the web");
        let response: SearchResponse = run_blocking(move || {
            let body = serde_json::json!({
                "query": query,
                "search_depth": "advanced",
                "max_results": max_results,
                "include_answer": true,
            });
            let response = client
                .post(&url)
                .set("Content-Type", "application/json")
                .set("Authorization", &auth)
                .send_json(&body)?;
            Ok(response.into_json()?)
        })
        .await?;

        Ok(format_results(&response, self.max_results))
    }
}

/// Render an answer line followed by numbered sources
fn format_results(response: &SearchResponse, max_results: usize) -> String {
    if response.results.is_empty() && response.answer.is_none() {
        return "No results found.".to_string();
    }

    let mut lines = Vec::new();
    if let Some(answer) = response.answer.as_deref().filter(|a| !a.is_empty()) {
        lines.push(format!("Answer: {}", answer));
    }
    for (idx, hit) in response.results.iter().take(max_results).enumerate() {
        lines.push(format!(
            "{}. [{}]({}): {}",
            idx + 1,
            hit.title,
            hit.url,
            hit.content
        ));
    }
    lines.join("\n")
}
