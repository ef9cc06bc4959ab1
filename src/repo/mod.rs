use crate::domain::payment::{PaymentRecord, PaymentUpsert};
use anyhow::Result;

pub mod memory;
pub mod payments_repo;

#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    // atomic: repeated deliveries for one id never create a second record
    async fn upsert_event(&self, upsert: &PaymentUpsert) -> Result<()>;

    async fn list_pending_notification(&self, limit: i64) -> Result<Vec<PaymentRecord>>;

    async fn mark_buyer_notified(&self, id: &str) -> Result<()>;

    async fn mark_admin_notified(&self, id: &str) -> Result<()>;
}
