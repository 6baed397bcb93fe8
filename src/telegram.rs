//! Telegram Bot API transport (long polling)

use async_trait::async_trait;
use courier_core::config::TransportConfig;
use courier_core::{ChatTransport, ConversationId, Inbound, TransportError};
use serde::Deserialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Extra read time on top of the long-poll timeout
const READ_MARGIN_SECS: u64 = 10;

pub struct TelegramTransport {
    base_url: String,
    poll_timeout: u64,
    offset: AtomicI64,
    client: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    #[serde(default)]
    from: Option<User>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
}

impl TelegramTransport {
    pub fn new(bot_token: &str, config: &TransportConfig) -> Self {
        let client = ureq::AgentBuilder::new()
            .timeout_read(Duration::from_secs(config.poll_timeout + READ_MARGIN_SECS))
            .build();
        Self {
            base_url: format!(
                "{}/bot{}",
                config.api_base.trim_end_matches('/'),
                bot_token
            ),
            poll_timeout: config.poll_timeout,
            offset: AtomicI64::new(0),
            client,
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn receive(&self) -> Result<Vec<Inbound>, TransportError> {
        let url = format!("{}/getUpdates", self.base_url);
        let offset = self.offset.load(Ordering::SeqCst);
        let timeout = self.poll_timeout.to_string();
        let client = self.client.clone();

        let response: ApiResponse<Vec<Update>> = blocking(move || {
            let response = client
                .get(&url)
                .query("offset", &offset.to_string())
                .query("timeout", &timeout)
                .query("allowed_updates", r#"["message"]"#)
                .call()?;
            Ok(response.into_json()?)
        })
        .await?;

        let updates = into_result(response)?;
        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::SeqCst);
        }
        Ok(to_inbound(updates))
    }

    async fn send(&self, conversation: &ConversationId, text: &str) -> Result<(), TransportError> {
        let url = format!("{}/sendMessage", self.base_url);
        let body = serde_json::json!({
            "chat_id": conversation.as_str(),
            "text": text,
        });
        let client = self.client.clone();

        let response: ApiResponse<serde_json::Value> = blocking(move || {
            let response = client
                .post(&url)
                .set("Content-Type", "application/json")
                .send_json(&body)?;
            Ok(response.into_json()?)
        })
        .await?;

        into_result(response).map(|_| ())
    }
}

fn into_result<T>(response: ApiResponse<T>) -> Result<T, TransportError> {
    match (response.ok, response.result) {
        (true, Some(result)) => Ok(result),
        (true, None) => Err(TransportError::Decode("missing result".to_string())),
        (false, _) => Err(TransportError::Api {
            code: response.error_code.unwrap_or(0),
            description: response
                .description
                .unwrap_or_else(|| "Unknown error".to_string()),
        }),
    }
}

/// Keep text messages with a sender; other updates are skipped
fn to_inbound(updates: Vec<Update>) -> Vec<Inbound> {
    updates
        .into_iter()
        .filter_map(|update| {
            let message = update.message?;
            let text = message.text?;
            let user = message.from?;
            Some(Inbound::new(user.id, message.chat.id, text))
        })
        .collect()
}

async fn blocking<T, F>(call: F) -> Result<T, TransportError>
where
    F: FnOnce() -> Result<T, TransportError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| TransportError::Http(format!("worker failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::UserId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_updates_become_inbound_messages() {
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(
            r#"{"ok": true, "result": [
                {"update_id": 7, "message": {"chat": {"id": -100}, "from": {"id": 42}, "text": "/reset"}},
                {"update_id": 8, "message": {"chat": {"id": 5}, "from": {"id": 5}}},
                {"update_id": 9, "edited_message": {}}
            ]}"#,
        )
        .unwrap();
        let inbound = to_inbound(into_result(response).unwrap());
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].user_id, UserId::from("42"));
        assert_eq!(inbound[0].conversation_id.as_str(), "-100");
        assert_eq!(inbound[0].text, "/reset");
    }

    #[test]
    fn test_api_error_response() {
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(
            r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#,
        )
        .unwrap();
        match into_result(response) {
            Err(TransportError::Api { code, description }) => {
                assert_eq!(code, 401);
                assert_eq!(description, "Unauthorized");
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_base_url_includes_token() {
        let transport = TelegramTransport::new("123:abc", &TransportConfig::default());
        assert_eq!(transport.base_url, "https://api.telegram.org/bot123:abc");
    }
}
