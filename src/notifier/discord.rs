//! Discord bot backend
//!
//! Posts plain text messages to one channel through the Discord REST API.
//! The live status is replaced by deleting the previous message and sending a new one.

use super::{MessageBackend, MessageId};
use crate::utils::AppError;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

/// Discord message payload
#[derive(Debug, Serialize)]
struct DiscordMessage<'a> {
    /// Message content (plain text)
    content: &'a str,
}

/// Created message (only the fields we use)
#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: String,
}

/// Bot account returned by `/users/@me`
#[derive(Debug, Deserialize)]
struct BotUser {
    username: String,
}

/// Discord error body
#[derive(Debug, Deserialize)]
struct DiscordError {
    message: String,
}

/// Discord backend bound to one channel
#[derive(Debug, Clone)]
pub struct DiscordBackend {
    /// HTTP client
    client: Client,
    /// API base URL (without trailing slash)
    api_base: String,
    /// Bot token
    bot_token: String,
    /// Destination channel
    channel_id: u64,
}

impl DiscordBackend {
    /// Create a new Discord backend
    pub fn new(client: Client, api_base: &str, bot_token: &str, channel_id: u64) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            channel_id,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }

    fn message_url(&self, id: &MessageId) -> String {
        format!("{}/{}", self.messages_url(), id)
    }

    /// Attach the bot token and send the request
    async fn execute(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = request
            .header(AUTHORIZATION, format!("Bot {}", self.bot_token))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<DiscordError>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        error!(status = %status, body = %message, "Discord API returned error");

        Err(classify_status(status, message))
    }
}

/// 403, or 404 for the channel itself, means the bot cannot reach the channel
fn classify_status(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::FORBIDDEN => AppError::destination_unavailable(message),
        StatusCode::NOT_FOUND if message.contains("Unknown Channel") => {
            AppError::destination_unavailable(message)
        }
        _ => AppError::api(status.as_u16(), message),
    }
}

#[async_trait]
impl MessageBackend for DiscordBackend {
    #[instrument(skip(self, text), fields(channel_id = self.channel_id))]
    async fn send(&self, text: &str) -> Result<MessageId, AppError> {
        let request = self
            .client
            .post(self.messages_url())
            .json(&DiscordMessage { content: text });

        let created: CreatedMessage = self
            .execute(request)
            .await?
            .json()
            .await
            .map_err(|e| AppError::invalid_response(e.without_url().to_string()))?;

        debug!(message_id = %created.id, "Discord message sent");
        Ok(MessageId(created.id))
    }

    #[instrument(skip(self, text), fields(channel_id = self.channel_id))]
    async fn edit(&self, id: &MessageId, text: &str) -> Result<(), AppError> {
        let request = self
            .client
            .patch(self.message_url(id))
            .json(&DiscordMessage { content: text });

        self.execute(request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(channel_id = self.channel_id))]
    async fn delete(&self, id: &MessageId) -> Result<(), AppError> {
        let request = self.client.delete(self.message_url(id));

        self.execute(request).await?;
        debug!(message_id = %id, "Discord message deleted");
        Ok(())
    }

    async fn identity(&self) -> Result<String, AppError> {
        let request = self.client.get(format!("{}/users/@me", self.api_base));

        let user: BotUser = self
            .execute(request)
            .await?
            .json()
            .await
            .map_err(|e| AppError::invalid_response(e.without_url().to_string()))?;

        Ok(user.username)
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> DiscordBackend {
        DiscordBackend::new(Client::new(), "https://discord.com/api/v10/", "token", 42)
    }

    #[test]
    fn should_build_channel_urls() {
        let backend = backend();

        assert_eq!(
            backend.messages_url(),
            "https://discord.com/api/v10/channels/42/messages"
        );
        assert_eq!(
            backend.message_url(&MessageId("777".to_string())),
            "https://discord.com/api/v10/channels/42/messages/777"
        );
    }

    #[test]
    fn should_treat_unknown_channel_as_unavailable_destination() {
        let error = classify_status(StatusCode::NOT_FOUND, "Unknown Channel".to_string());

        assert!(matches!(error, AppError::DestinationUnavailable(_)));
    }

    #[test]
    fn should_treat_missing_access_as_unavailable_destination() {
        let error = classify_status(StatusCode::FORBIDDEN, "Missing Access".to_string());

        assert!(matches!(error, AppError::DestinationUnavailable(_)));
    }

    #[test]
    fn should_keep_unknown_message_as_api_error() {
        let error = classify_status(StatusCode::NOT_FOUND, "Unknown Message".to_string());

        assert!(matches!(error, AppError::Api { status: 404, .. }));
    }

    #[test]
    fn should_serialize_content_payload() {
        let payload = serde_json::to_string(&DiscordMessage { content: "hi" }).unwrap();

        assert_eq!(payload, r#"{"content":"hi"}"#);
    }
}
