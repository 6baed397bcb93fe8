//! Source-control capability backed by GitHub issues

use super::{require_task, Capability, CapabilityProvider};
use crate::config::SourceControlConfig;
use crate::provider::run_blocking;
use crate::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;

/// Opens one issue per task in a fixed repository
pub struct GitHubIssues {
    token: String,
    base_url: String,
    owner: String,
    repo: String,
    issue_title: String,
    client: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    number: u64,
    html_url: String,
}

impl GitHubIssues {
    pub fn from_config(config: &SourceControlConfig) -> Option<Self> {
        Some(Self {
            token: config.token.clone()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone()?,
            repo: config.repo.clone(),
            issue_title: config.issue_title.clone(),
            client: ureq::Agent::new(),
        })
    }

    fn issues_url(&self) -> String {
        format!("{}/repos/{}/{}/issues", self.base_url, self.owner, self.repo)
    }
}

#[async_trait]
impl CapabilityProvider for GitHubIssues {
    fn capability(&self) -> Capability {
        Capability::SourceControl
    }

    async fn invoke(&self, task: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "title": self.issue_title,
            "body": require_task(task)?,
        });
        let url = self.issues_url();
        let auth = format!("Bearer {}", self.token);
        let client = self.client.clone();

        let issue: CreatedIssue = run_blocking(move || {
            let response = client
                .post(&url)
                .set("Accept", "application/vnd.github+json")
                .set("Authorization", &auth)
                .set("User-Agent", "courier")
                .set("X-GitHub-Api-Version", "2022-11-28")
                .send_json(&body)?;
            Ok(response.into_json()?)
        })
        .await?;

        tracing::info!(number = issue.number, repo = %self.repo, "issue created");
        Ok(format!("Issue #{} created: {}", issue.number, issue.html_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SourceControlConfig {
        SourceControlConfig {
            token: Some("ghp_test".to_string()),
            owner: Some("octocat".to_string()),
            base_url: "https://api.github.com/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_issues_url() {
        let provider = GitHubIssues::from_config(&config()).unwrap();
        assert_eq!(
            provider.issues_url(),
            "https://api.github.com/repos/octocat/ai-agent-tasks/issues"
        );
        assert_eq!(provider.capability(), Capability::SourceControl);
    }

    #[test]
    fn test_from_config_requires_owner() {
        let mut config = config();
        config.owner = None;
        assert!(GitHubIssues::from_config(&config).is_none());
    }

    #[test]
    fn test_created_issue_shape() {
        let issue: CreatedIssue = serde_json::from_str(
            r#"{"number": 7, "html_url": "https://github.com/octocat/ai-agent-tasks/issues/7", "state": "open"}"#,
        )
        .unwrap();
        assert_eq!(issue.number, 7);
    }
}
