use crate::domain::payment::{PaymentRecord, PaymentUpsert};
use crate::repo::PaymentStore;
use anyhow::Result;
use chrono::Utc;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<PaymentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<PaymentRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PaymentStore for MemoryStore {
    async fn upsert_event(&self, upsert: &PaymentUpsert) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let now = Utc::now();
        match records.iter_mut().find(|r| r.id == upsert.id) {
            Some(existing) => {
                existing.event = upsert.event.clone();
                existing.amount = upsert.amount.clone();
                existing.currency = upsert.currency.clone();
                existing.description = upsert.description.clone();
                existing.metadata = upsert.metadata.clone();
                existing.raw = upsert.raw.clone();
                existing.updated_at = now;
            }
            None => records.push(PaymentRecord {
                id: upsert.id.clone(),
                event: upsert.event.clone(),
                amount: upsert.amount.clone(),
                currency: upsert.currency.clone(),
                description: upsert.description.clone(),
                metadata: upsert.metadata.clone(),
                raw: upsert.raw.clone(),
                created_at: now,
                updated_at: now,
                buyer_notified: false,
                admin_notified: false,
            }),
        }
        Ok(())
    }

    async fn list_pending_notification(&self, limit: i64) -> Result<Vec<PaymentRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.is_succeeded() && (!r.buyer_notified || !r.admin_notified))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn mark_buyer_notified(&self, id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(r) = records.iter_mut().find(|r| r.id == id) {
            r.buyer_notified = true;
            r.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_admin_notified(&self, id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(r) = records.iter_mut().find(|r| r.id == id) {
            r.admin_notified = true;
            r.updated_at = Utc::now();
        }
        Ok(())
    }
}
