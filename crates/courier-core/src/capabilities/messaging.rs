//! Messaging capability backed by a Telegram notification chat

use super::{require_task, Capability, CapabilityProvider};
use crate::config::MessagingConfig;
use crate::provider::run_blocking;
use crate::ProviderError;
use async_trait::async_trait;

/// Sends a task notification to a fixed chat
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    api_base: String,
    client: ureq::Agent,
}

impl TelegramNotifier {
    pub fn from_config(config: &MessagingConfig) -> Option<Self> {
        Some(Self {
            bot_token: config.bot_token.clone()?,
            chat_id: config.chat_id.clone()?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client: ureq::Agent::new(),
        })
    }
}

pub(crate) fn notification_text(task: &str) -> String {
    format!("🔔 Executing task: {}", task)
}

#[async_trait]
impl CapabilityProvider for TelegramNotifier {
    fn capability(&self) -> Capability {
        Capability::Messaging
    }

    async fn invoke(&self, task: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": notification_text(require_task(task)?),
        });
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let client = self.client.clone();

        run_blocking(move || {
            let response = client
                .post(&url)
                .set("Content-Type", "application/json")
                .send_json(&body)?;
            let json: serde_json::Value = response.into_json()?;
            if json.get("ok").and_then(|v| v.as_bool()) == Some(true) {
                Ok(())
            } else {
                let description = json
                    .get("description")
                    .and_then(|d| d.as_str())
                    .unwrap_or("sendMessage rejected");
                Err(ProviderError::InvalidRequest(description.to_string()))
            }
        })
        .await?;

        Ok(format!("Notification sent to chat {}", self.chat_id))
    }
}
