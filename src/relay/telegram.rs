//! Telegram Bot API client
//!
//! Used by the relay server to deliver messages to a single chat.

use crate::config::TelegramConfig;
use crate::constants::relay::PARSE_MODE;
use crate::error::{Error, Result};
use serde::Serialize;
use std::time::Duration;

/// `sendMessage` request body
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// What Telegram answered
#[derive(Debug, Clone)]
pub struct TelegramReply {
    /// HTTP status from the Bot API
    pub status: u16,
    /// Whether the HTTP status was a success
    pub ok: bool,
    /// Response body (Telegram always answers with JSON; `Null` if it did not)
    pub body: serde_json::Value,
}

impl TelegramReply {
    /// Human-readable failure reason from the reply
    pub fn description(&self) -> Option<&str> {
        self.body.get("description").and_then(|d| d.as_str())
    }
}

/// Minimal Telegram Bot API client
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramClient {
    /// Create a client from the `[telegram]` config section
    pub fn from_config(config: &TelegramConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    /// Whether both the token and the chat id are set
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }

    /// Send `text` to the configured chat
    ///
    /// Only transport failures are errors; an HTTP error from Telegram comes
    /// back as a reply with `ok == false`.
    pub async fn send_message(&self, text: &str) -> Result<TelegramReply> {
        let response = self
            .client
            .post(self.send_message_url())
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
                parse_mode: PARSE_MODE,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);

        Ok(TelegramReply {
            status: status.as_u16(),
            ok: status.is_success(),
            body,
        })
    }
}
