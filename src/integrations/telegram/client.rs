//! Minimal Telegram Bot API client
//!
//! Only the two calls the bot needs: `sendMessage` and long-polling
//! `getUpdates`. Request errors are stripped of their URL because the URL
//! carries the bot token.

use crate::events::Notifier;
use crate::integrations::HTTP_CLIENT;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Extra time on top of the long-poll timeout before the request itself gives up
const LONG_POLL_GRACE: Duration = Duration::from_secs(10);

/// Envelope wrapping every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self, method: &str) -> Result<T> {
        if !self.ok {
            anyhow::bail!(
                "Telegram {} failed: {}",
                method,
                self.description.as_deref().unwrap_or("no description")
            );
        }
        self.result
            .ok_or_else(|| anyhow::anyhow!("Telegram {} returned no result", method))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone)]
pub struct TelegramClient {
    /// `{api_url}/bot{token}`
    base_url: String,
    /// Where start/stop notifications go
    chat_id: Option<String>,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, chat_id: Option<String>) -> Self {
        Self {
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            chat_id,
        }
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);

        let mut request = HTTP_CLIENT.post(&url).json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| e.without_url())?;
        let status = response.status();

        // Error replies still carry the JSON envelope with a description
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            anyhow::anyhow!("Telegram {} returned {}: {}", method, status, e.without_url())
        })?;

        envelope.into_result(method)
    }

    /// Send a plain-text message
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let _: Message = self
            .call(
                "sendMessage",
                serde_json::json!({ "chat_id": chat_id, "text": text }),
                None,
            )
            .await?;
        Ok(())
    }

    /// Long-poll for updates newer than `offset`
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut body = serde_json::json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = offset.into();
        }

        self.call(
            "getUpdates",
            body,
            Some(Duration::from_secs(timeout_secs) + LONG_POLL_GRACE),
        )
        .await
    }
}

impl Notifier for TelegramClient {
    async fn send(&self, text: &str) -> Result<()> {
        let Some(chat_id) = self.chat_id.as_deref() else {
            tracing::debug!("No chat id configured, skipping notification");
            return Ok(());
        };
        self.send_message(chat_id, text).await
    }
}
