//! Telegram Bot API client over plain HTTPS.
//!
//! Covers the handful of methods the bot needs (`sendMessage`,
//! `getUpdates`, `answerCallbackQuery`) without pulling in a bot
//! framework. API-level errors ("ok": false) surface as
//! `RatewatchError::Telegram` with the API's description.

use crate::domain::NotifyPeriod;
use crate::error::{RatewatchError, Result};
use crate::traits::Transport;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ==================== API payload types ====================

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Incoming update from getUpdates
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

/// Button press on an inline keyboard
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    callback_data: String,
}

/// Callback payload prefix for period picker buttons
pub const PERIOD_CALLBACK_PREFIX: &str = "notify_";

/// The period picker shown by /notify: three cadences plus an off switch.
fn period_keyboard() -> InlineKeyboardMarkup {
    let button = |text: &str, period: NotifyPeriod| InlineKeyboardButton {
        text: text.to_string(),
        callback_data: format!("{PERIOD_CALLBACK_PREFIX}{}", period.as_str()),
    };

    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![
                button("Раз в день", NotifyPeriod::Daily),
                button("Раз в неделю", NotifyPeriod::Weekly),
                button("Раз в месяц", NotifyPeriod::Monthly),
            ],
            vec![button("Отключить", NotifyPeriod::Off)],
        ],
    }
}

// ==================== Client ====================

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(RatewatchError::Telegram(
                "bot token must not be empty".to_string(),
            ));
        }

        // Default bound for sends; getUpdates overrides per request to
        // outlast its long-poll window.
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| RatewatchError::Telegram(format!("client build failed: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    /// POST one Bot API method and unwrap the response envelope
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;

        let envelope: ApiResponse<T> = response.json().await?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "unknown Telegram API error".to_string());
            return Err(RatewatchError::Telegram(description));
        }

        envelope
            .result
            .ok_or_else(|| RatewatchError::Telegram("missing result field".to_string()))
    }

    /// Long-poll for updates after `offset`.
    ///
    /// The HTTP timeout must exceed the long-poll timeout or every idle
    /// poll turns into a client-side error.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .json(&serde_json::json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }))
            .timeout(std::time::Duration::from_secs(timeout_secs + 10))
            .send()
            .await?;

        let envelope: ApiResponse<Vec<Update>> = response.json().await?;
        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "unknown Telegram API error".to_string());
            return Err(RatewatchError::Telegram(description));
        }

        Ok(envelope.result.unwrap_or_default())
    }

    /// Acknowledge a button press so the client stops showing a spinner
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                serde_json::json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }

    /// Send the period picker keyboard
    pub async fn send_period_keyboard(&self, chat_id: i64, text: &str) -> Result<()> {
        let _: Message = self
            .call(
                "sendMessage",
                serde_json::json!({
                    "chat_id": chat_id,
                    "text": text,
                    "reply_markup": period_keyboard(),
                }),
            )
            .await?;

        debug!("Sent period keyboard to chat {}", chat_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transport for TelegramClient {
    async fn send_message(&self, user_id: i64, text: &str) -> Result<()> {
        let _: Message = self
            .call(
                "sendMessage",
                serde_json::json!({
                    "chat_id": user_id,
                    "text": text,
                }),
            )
            .await?;

        info!("Message sent to user {}", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_keyboard_layout() {
        let keyboard = period_keyboard();
        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert_eq!(keyboard.inline_keyboard[0].len(), 3);
        assert_eq!(keyboard.inline_keyboard[1].len(), 1);

        let json = serde_json::to_value(&keyboard).unwrap();
        assert_eq!(
            json["inline_keyboard"][0][0]["callback_data"],
            "notify_daily"
        );
        assert_eq!(json["inline_keyboard"][1][0]["callback_data"], "notify_off");
    }

    #[test]
    fn test_parse_message_update() {
        let raw = r#"{
            "update_id": 1001,
            "message": {
                "message_id": 7,
                "from": {"id": 42, "is_bot": false, "first_name": "Test"},
                "chat": {"id": 42, "type": "private"},
                "text": "/start"
            }
        }"#;

        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(update.update_id, 1001);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn test_parse_callback_update() {
        let raw = r#"{
            "update_id": 1002,
            "callback_query": {
                "id": "abc123",
                "from": {"id": 42, "is_bot": false, "first_name": "Test"},
                "data": "notify_weekly"
            }
        }"#;

        let update: Update = serde_json::from_str(raw).unwrap();
        let callback = update.callback_query.unwrap();
        assert_eq!(callback.from.id, 42);
        assert_eq!(callback.data.as_deref(), Some("notify_weekly"));
    }

    #[test]
    fn test_method_url_hides_no_surprises() {
        let client = TelegramClient::new("https://api.telegram.org/", "123:ABC").unwrap();
        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(TelegramClient::new("https://api.telegram.org", "").is_err());
    }
}
