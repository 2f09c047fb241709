use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

/// All relayed messages use legacy Markdown formatting.
const PARSE_MODE: &str = "Markdown";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Transport seam for delivering one message to one chat.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()>;
}

/// Thin client for the Telegram Bot API `sendMessage` endpoint.
pub struct TelegramClient {
    client: reqwest::Client,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(bot_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token,
        }
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: PARSE_MODE,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to reach Telegram API for chat {chat_id}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Telegram API error for chat {}: {} {}", chat_id, status, body);
            anyhow::bail!("Telegram API error ({status}): {body}");
        }

        debug!("Message delivered to chat {}", chat_id);
        Ok(())
    }
}
