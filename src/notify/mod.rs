use anyhow::Result;

pub mod mock;
pub mod telegram;

#[async_trait::async_trait]
pub trait NotifyChannel: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()>;
}
