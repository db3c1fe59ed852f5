//! Long-poll update loop.
//!
//! Pulls updates with getUpdates and routes them to the command
//! handlers. One bad update never kills the loop; a failed poll backs
//! off briefly and retries.

use crate::adapters::telegram::{CallbackQuery, Message, TelegramClient, Update, PERIOD_CALLBACK_PREFIX};
use crate::bot::handlers::{CommandHandlers, CHOOSE_PERIOD_TEXT, SETTINGS_FAILED_TEXT};
use crate::domain::NotifyPeriod;
use crate::error::Result;
use crate::traits::Transport;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, info, warn};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Drives getUpdates and dispatches commands and button presses
pub struct UpdateListener {
    api: Arc<TelegramClient>,
    handlers: CommandHandlers,
    poll_timeout_secs: u64,
}

impl UpdateListener {
    pub fn new(api: Arc<TelegramClient>, handlers: CommandHandlers, poll_timeout_secs: u64) -> Self {
        Self {
            api,
            handlers,
            poll_timeout_secs,
        }
    }

    /// Poll forever. Returns only if the surrounding task is cancelled.
    pub async fn run(&self) {
        info!("Update listener started (poll timeout: {}s)", self.poll_timeout_secs);
        let mut offset: i64 = 0;

        loop {
            let updates = match self.api.get_updates(offset, self.poll_timeout_secs).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("getUpdates failed, retrying: {}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Err(e) = self.handle_update(update).await {
                    warn!("Failed to handle update: {}", e);
                }
            }
        }
    }

    async fn handle_update(&self, update: Update) -> Result<()> {
        if let Some(message) = update.message {
            return self.handle_message(message).await;
        }
        if let Some(callback) = update.callback_query {
            return self.handle_callback(callback).await;
        }
        Ok(())
    }

    async fn handle_message(&self, message: Message) -> Result<()> {
        let chat_id = message.chat.id;
        let Some(text) = message.text else {
            return Ok(());
        };

        // Commands may carry a bot mention suffix ("/rates@my_bot")
        let command = text
            .split_whitespace()
            .next()
            .map(|c| c.split('@').next().unwrap_or(c))
            .unwrap_or("");

        match command {
            "/start" => {
                let reply = match self.handlers.on_user_seen(chat_id).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!("Failed to register user {}: {}", chat_id, e);
                        SETTINGS_FAILED_TEXT.to_string()
                    }
                };
                self.api.send_message(chat_id, &reply).await
            }
            "/rates" => {
                let reply = self.handlers.on_rates_requested().await;
                self.api.send_message(chat_id, &reply).await
            }
            "/notify" => self.api.send_period_keyboard(chat_id, CHOOSE_PERIOD_TEXT).await,
            _ => {
                debug!("Ignoring unrecognized message in chat {}", chat_id);
                Ok(())
            }
        }
    }

    async fn handle_callback(&self, callback: CallbackQuery) -> Result<()> {
        // Acknowledge first so the client stops the button spinner even if
        // the settings write fails below.
        if let Err(e) = self.api.answer_callback_query(&callback.id).await {
            warn!("answerCallbackQuery failed: {}", e);
        }

        let user_id = callback.from.id;
        let Some(period) = callback
            .data
            .as_deref()
            .and_then(|d| d.strip_prefix(PERIOD_CALLBACK_PREFIX))
            .and_then(|p| p.parse::<NotifyPeriod>().ok())
        else {
            debug!("Ignoring callback with unrecognized payload from {}", user_id);
            return Ok(());
        };

        let reply = match self.handlers.on_period_chosen(user_id, period).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Failed to store period for user {}: {}", user_id, e);
                SETTINGS_FAILED_TEXT.to_string()
            }
        };

        self.api.send_message(user_id, &reply).await
    }
}
