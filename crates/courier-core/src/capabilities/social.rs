//! Social posting capability backed by the X/Twitter v2 API

use super::{require_task, Capability, CapabilityProvider};
use crate::config::SocialConfig;
use crate::orchestration::truncate_chars;
use crate::provider::run_blocking;
use crate::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;

/// Maximum characters of one post
const POST_LIMIT: usize = 280;

/// Publishes the task text as a post
pub struct TwitterPoster {
    bearer_token: String,
    base_url: String,
    client: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
}

impl TwitterPoster {
    pub fn from_config(config: &SocialConfig) -> Option<Self> {
        Some(Self {
            bearer_token: config.bearer_token.clone()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: ureq::Agent::new(),
        })
    }
}

/// Clip post text to the platform limit on a char boundary
fn post_text(task: &str) -> String {
    truncate_chars(task, POST_LIMIT)
}

#[async_trait]
impl CapabilityProvider for TwitterPoster {
    fn capability(&self) -> Capability {
        Capability::Social
    }

    async fn invoke(&self, task: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({ "text": post_text(require_task(task)?) });
        let url = format!("{}/2/tweets", self.base_url);
        let auth = format!("Bearer {}", self.bearer_token);
        let client = self.client.clone();

        let posted: PostResponse = run_blocking(move || {
            let response = client
                .post(&url)
                .set("Content-Type", "application/json")
                .set("Authorization", &auth)
                .send_json(&body)?;
            Ok(response.into_json()?)
        })
        .await?;

        Ok(format!("Post published (id {})", posted.data.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_unchanged() {
        assert_eq!(post_text("Release 1.2 is out"), "Release 1.2 is out");
    }

    #[test]
    fn test_long_text_is_clipped() {
        let long = "ж".repeat(400);
        let clipped = post_text(&long);
        assert_eq!(clipped.chars().count(), POST_LIMIT);
        assert!(clipped.ends_with('…'));
    }

    #[test]
    fn test_response_shape() {
        let posted: PostResponse =
            serde_json::from_str(r#"{"data": {"id": "1445880548472328192", "text": "hi"}}"#)
                .unwrap();
        assert_eq!(posted.data.id, "1445880548472328192");
    }

    #[test]
    fn test_from_config_requires_token() {
        assert!(TwitterPoster::from_config(&SocialConfig::default()).is_none());
    }
}
