use crate::notify::NotifyChannel;
use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockChannel {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl NotifyChannel for MockChannel {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("mock channel down");
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}
