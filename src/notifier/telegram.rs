//! Telegram Bot API backend
//!
//! Sends plain text messages to a single chat and edits them in place.

use super::{MessageBackend, MessageId};
use crate::utils::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

/// Telegram's answer when an edit would not change the text
const NOT_MODIFIED: &str = "message is not modified";

/// Telegram API response envelope
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<u16>,
}

/// Sent message (only the fields we use)
#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Bot account returned by `getMe`
#[derive(Debug, Deserialize)]
struct BotUser {
    first_name: String,
    username: Option<String>,
}

/// Telegram backend bound to one chat
#[derive(Debug, Clone)]
pub struct TelegramBackend {
    /// HTTP client
    client: Client,
    /// API base URL (without trailing slash)
    api_base: String,
    /// Bot token from @BotFather
    bot_token: String,
    /// Destination chat
    chat_id: String,
}

impl TelegramBackend {
    /// Create a new Telegram backend
    pub fn new(client: Client, api_base: &str, bot_token: &str, chat_id: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    /// Call a Bot API method and unwrap the response envelope
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, AppError> {
        let url = format!("{}/bot{}/{}", self.api_base, self.bot_token, method);

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        let envelope: TelegramResponse<T> = response.json().await.map_err(|e| {
            AppError::invalid_response(format!(
                "{} returned unreadable body ({}): {}",
                method,
                status,
                e.without_url()
            ))
        })?;

        if !envelope.ok {
            let description = envelope.description.unwrap_or_default();
            if description.contains("chat not found") {
                return Err(AppError::destination_unavailable(description));
            }
            return Err(AppError::api(
                envelope.error_code.unwrap_or(status.as_u16()),
                description,
            ));
        }

        envelope
            .result
            .ok_or_else(|| AppError::invalid_response(format!("{} returned no result", method)))
    }

    fn numeric_id(id: &MessageId) -> Result<i64, AppError> {
        id.0.parse()
            .map_err(|_| AppError::invalid_response(format!("Invalid Telegram message id {}", id)))
    }
}

#[async_trait]
impl MessageBackend for TelegramBackend {
    #[instrument(skip(self, text), fields(chat_id = %self.chat_id))]
    async fn send(&self, text: &str) -> Result<MessageId, AppError> {
        let sent: SentMessage = self
            .call(
                "sendMessage",
                json!({ "chat_id": self.chat_id, "text": text }),
            )
            .await?;

        debug!(message_id = sent.message_id, "Telegram message sent");
        Ok(MessageId::from(sent.message_id))
    }

    #[instrument(skip(self, text), fields(chat_id = %self.chat_id))]
    async fn edit(&self, id: &MessageId, text: &str) -> Result<(), AppError> {
        let message_id = Self::numeric_id(id)?;

        // Result is the edited Message, or `true` for inline messages
        let result = self
            .call::<serde_json::Value>(
                "editMessageText",
                json!({ "chat_id": self.chat_id, "message_id": message_id, "text": text }),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(AppError::Api { message, .. }) if message.contains(NOT_MODIFIED) => {
                debug!(message_id, "Telegram message unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self), fields(chat_id = %self.chat_id))]
    async fn delete(&self, id: &MessageId) -> Result<(), AppError> {
        let message_id = Self::numeric_id(id)?;

        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": self.chat_id, "message_id": message_id }),
            )
            .await?;

        Ok(())
    }

    async fn identity(&self) -> Result<String, AppError> {
        let user: BotUser = self.call("getMe", json!({})).await?;
        Ok(user.username.map(|u| format!("@{}", u)).unwrap_or(user.first_name))
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_trim_trailing_slash_from_api_base() {
        let backend = TelegramBackend::new(Client::new(), "https://api.telegram.org/", "t", "1");

        assert_eq!(backend.api_base, "https://api.telegram.org");
    }

    #[test]
    fn should_reject_non_numeric_message_id() {
        let result = TelegramBackend::numeric_id(&MessageId("abc".to_string()));

        assert!(matches!(result, Err(AppError::InvalidResponse(_))));
    }

    #[test]
    fn should_parse_error_envelope() {
        // Arrange
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: message is not modified"}"#;

        // Act
        let envelope: TelegramResponse<serde_json::Value> = serde_json::from_str(body).unwrap();

        // Assert
        assert!(!envelope.ok);
        assert!(envelope.result.is_none());
        assert_eq!(envelope.error_code, Some(400));
        assert!(envelope.description.unwrap().contains(NOT_MODIFIED));
    }
}
