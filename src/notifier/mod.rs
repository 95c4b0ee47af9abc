//! Status message delivery
//!
//! Keeps at most one live status message in the destination chat:
//! - Telegram edits the previous message in place
//! - Discord deletes the previous message and sends a new one
//!
//! Delivery failures are logged and swallowed here so the poll loop never stops.

pub mod discord;
pub mod telegram;

pub use discord::DiscordBackend;
pub use telegram::TelegramBackend;

use crate::config::{AppConfig, BotConfig};
use crate::utils::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Identity of a message sent through a backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        MessageId(id.to_string())
    }
}

/// Raw messaging capability of a chat platform
///
/// Abstracted so tests can replace the HTTP clients with mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageBackend: Send + Sync {
    /// Send a new message and return its id
    async fn send(&self, text: &str) -> Result<MessageId, AppError>;

    /// Replace the text of an existing message
    async fn edit(&self, id: &MessageId, text: &str) -> Result<(), AppError>;

    /// Delete an existing message
    async fn delete(&self, id: &MessageId) -> Result<(), AppError>;

    /// Name of the bot account the token belongs to
    async fn identity(&self) -> Result<String, AppError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// How a new status replaces the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Edit the live message; send only when none exists
    EditInPlace,
    /// Delete the live message (best-effort), then send a new one
    DeleteAndResend,
}

/// Destination for queue status notifications
#[async_trait]
pub trait NotificationSink: Send {
    /// Deliver or update the live status message. Never fails.
    async fn notify(&mut self, text: &str);

    /// Send a standalone message that is not tracked as the live status
    async fn announce_ready(&self, text: &str);
}

/// Notification sink backed by a chat platform
pub struct StatusNotifier {
    /// Platform client
    backend: Arc<dyn MessageBackend>,
    /// Replacement strategy for the live message
    strategy: UpdateStrategy,
    /// Currently live status message
    active: Option<MessageId>,
    /// Upper bound for a single backend call
    timeout: Duration,
}

impl StatusNotifier {
    /// Create a new notifier
    pub fn new(
        backend: Arc<dyn MessageBackend>,
        strategy: UpdateStrategy,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            strategy,
            active: None,
            timeout,
        }
    }

    /// Build the notifier for the configured platform
    pub fn from_config(config: &AppConfig) -> Self {
        let client = Client::new();
        let settings = &config.settings;

        let (backend, strategy): (Arc<dyn MessageBackend>, UpdateStrategy) = match &config.bot {
            BotConfig::Telegram { bot_token, chat_id } => (
                Arc::new(TelegramBackend::new(
                    client,
                    &settings.telegram_api_base,
                    bot_token,
                    chat_id,
                )),
                UpdateStrategy::EditInPlace,
            ),
            BotConfig::Discord {
                bot_token,
                channel_id,
            } => (
                Arc::new(DiscordBackend::new(
                    client,
                    &settings.discord_api_base,
                    bot_token,
                    *channel_id,
                )),
                UpdateStrategy::DeleteAndResend,
            ),
        };

        Self::new(backend, strategy, settings.notify_timeout)
    }

    /// Log which bot account is in use
    pub async fn log_in(&self) {
        match with_timeout(self.timeout, self.backend.identity()).await {
            Ok(name) => info!(backend = self.backend.name(), bot = %name, "Logged in"),
            Err(e) => warn!(
                backend = self.backend.name(),
                error = %e,
                error_code = e.error_code(),
                "Failed to verify bot identity"
            ),
        }
    }

    /// Currently live status message
    pub fn active_message(&self) -> Option<&MessageId> {
        self.active.as_ref()
    }

    /// Configured update strategy
    pub fn strategy(&self) -> UpdateStrategy {
        self.strategy
    }

    async fn edit_or_send(&mut self, text: &str) -> Result<(), AppError> {
        if let Some(id) = &self.active {
            with_timeout(self.timeout, self.backend.edit(id, text)).await?;
            debug!(message_id = %id, "Status message edited");
            return Ok(());
        }

        let id = with_timeout(self.timeout, self.backend.send(text)).await?;
        info!(message_id = %id, "Status message created");
        self.active = Some(id);
        Ok(())
    }

    async fn delete_and_resend(&mut self, text: &str) -> Result<(), AppError> {
        if let Some(previous) = self.active.take() {
            if let Err(e) = with_timeout(self.timeout, self.backend.delete(&previous)).await {
                warn!(
                    message_id = %previous,
                    error = %e,
                    error_code = e.error_code(),
                    "Failed to delete previous status message"
                );
            }
        }

        let id = with_timeout(self.timeout, self.backend.send(text)).await?;
        debug!(message_id = %id, "Status message resent");
        self.active = Some(id);
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for StatusNotifier {
    async fn notify(&mut self, text: &str) {
        let result = match self.strategy {
            UpdateStrategy::EditInPlace => self.edit_or_send(text).await,
            UpdateStrategy::DeleteAndResend => self.delete_and_resend(text).await,
        };

        if let Err(e) = result {
            error!(
                backend = self.backend.name(),
                error = %e,
                error_code = e.error_code(),
                "Failed to deliver status message"
            );
        }
    }

    async fn announce_ready(&self, text: &str) {
        match with_timeout(self.timeout, self.backend.send(text)).await {
            Ok(id) => info!(message_id = %id, "Startup message sent"),
            Err(e) => error!(
                backend = self.backend.name(),
                error = %e,
                error_code = e.error_code(),
                "Failed to send startup message"
            ),
        }
    }
}

/// Bound a backend call by `limit`
async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AppError::Timeout(limit))?
}
