// In crates/notifier/src/telegram.rs

use crate::{Error, Notifier, Result};
use app_config::types::TelegramSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest text the Bot API accepts in one message.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Sends messages through the Telegram Bot API `sendMessage` method.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http_client: reqwest::Client,
    bot_token: String,
    chat_id: String,
    base_url: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(settings: &TelegramSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http_client,
            bot_token: settings.bot_token.clone(),
            chat_id: settings.chat_id.clone(),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send_chunk(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self.http_client.post(&url).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<BotResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(BotResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotResponse { description, .. }) => Err(Error::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
            None => Err(Error::Rejected {
                status: status.as_u16(),
                description: body,
            }),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "TelegramNotifier"
    }

    async fn send(&self, message: &str) -> Result<()> {
        for chunk in split_message(message, MAX_MESSAGE_LEN) {
            self.send_chunk(chunk).await?;
        }
        tracing::debug!(chat_id = %self.chat_id, len = message.len(), "Telegram message sent");
        Ok(())
    }
}

/// Splits `message` into pieces of at most `max_len` bytes, preferring line breaks.
pub fn split_message(message: &str, max_len: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = message;
    while rest.len() > max_len {
        let mut cut = max_len;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        // Break after the last newline that fits, if any.
        if let Some(newline) = rest[..cut].rfind('\n') {
            cut = newline + 1;
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest);
    }
    chunks
}
