use crate::config::TelegramConfig;
use crate::error::DeliveryError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

/// Delivers a formatted message to the chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    url: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/bot{}/sendMessage", config.api_url.trim_end_matches('/'), config.bot_token),
            chat_id: config.chat_id.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self.client.post(&self.url).json(&payload).send().await.map_err(|e| {
            // reqwest errors carry the URL, which contains the bot token.
            let e = e.without_url();
            warn!("[Telegram] Failed to reach API: {}", e);
            DeliveryError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("[Telegram] Message rejected: {} - {}", status, body);
            return Err(DeliveryError::Rejected { status: status.as_u16(), body });
        }

        info!("[Telegram] Message sent to chat {}", self.chat_id);
        Ok(())
    }
}
