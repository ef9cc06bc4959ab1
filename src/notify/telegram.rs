use crate::notify::NotifyChannel;
use anyhow::{bail, Result};
use serde_json::json;
use std::time::Duration;

pub struct TelegramChannel {
    pub token: String,
    pub api_base: String,
    pub client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(token: String) -> Self {
        Self {
            token,
            api_base: "https://api.telegram.org".to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl NotifyChannel for TelegramChannel {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        if self.token.is_empty() {
            bail!("TG_BOT_TOKEN missing");
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let resp = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
                "disable_web_page_preview": true
            }))
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("telegram sendMessage HTTP {}: {}", status.as_u16(), body.chars().take(200).collect::<String>());
        }

        Ok(())
    }
}
