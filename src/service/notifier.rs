use crate::domain::payment::PaymentRecord;
use crate::notify::NotifyChannel;
use crate::repo::PaymentStore;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct PaymentsNotifier {
    pub store: Arc<dyn PaymentStore>,
    pub channel: Arc<dyn NotifyChannel>,
    pub admin_tg_id: String,
    pub alert: bool,
    pub quiet: bool,
    pub poll_interval: Duration,
    pub batch_size: i64,
    pub busy: AtomicBool,
}

impl PaymentsNotifier {
    pub async fn run(self: Arc<Self>) {
        tracing::info!(quiet = self.quiet, alert = self.alert, "payments notifier started");
        loop {
            if let Err(err) = self.tick().await {
                tracing::error!(%err, "notifier tick error");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub async fn tick(&self) -> Result<()> {
        // a slow tick is skipped, never overlapped
        if self.busy.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let res = self.tick_inner().await;
        self.busy.store(false, Ordering::SeqCst);
        res
    }

    async fn tick_inner(&self) -> Result<()> {
        let batch = self.store.list_pending_notification(self.batch_size).await?;
        for record in &batch {
            self.process(record).await;
        }
        Ok(())
    }

    // Each leg fails on its own: a buyer send error must not block the
    // operator alert, and both are retried on the next tick.
    async fn process(&self, record: &PaymentRecord) {
        if let Err(err) = self.notify_buyer(record).await {
            tracing::error!(id = %record.id, %err, "buyer notify failed");
        }
        if let Err(err) = self.notify_admin(record).await {
            tracing::error!(id = %record.id, %err, "admin notify failed");
        }
    }

    async fn notify_buyer(&self, record: &PaymentRecord) -> Result<()> {
        let Some(recipient) = record.recipient() else {
            return Ok(());
        };
        if record.buyer_notified {
            return Ok(());
        }

        if self.quiet {
            tracing::info!(id = %record.id, recipient = %recipient, "quiet mode: buyer send skipped");
        } else {
            self.channel.send(&recipient, &buyer_text(record)).await?;
            tracing::info!(id = %record.id, recipient = %recipient, "buyer notified");
        }
        self.store.mark_buyer_notified(&record.id).await?;
        Ok(())
    }

    async fn notify_admin(&self, record: &PaymentRecord) -> Result<()> {
        if !self.alert || self.admin_tg_id.is_empty() || record.admin_notified {
            return Ok(());
        }

        if self.quiet {
            tracing::info!(id = %record.id, "quiet mode: admin send skipped");
        } else {
            self.channel
                .send(&self.admin_tg_id, &admin_text(record))
                .await?;
            tracing::info!(id = %record.id, "admin notified");
        }
        self.store.mark_admin_notified(&record.id).await?;
        Ok(())
    }
}

fn buyer_text(record: &PaymentRecord) -> String {
    format!(
        "Спасибо! Оплата принята ✅\n{}\nСумма: {} {}\nКод оплаты: {}",
        record.description.as_deref().unwrap_or(""),
        record.amount.as_deref().unwrap_or("0.00"),
        record.currency.as_deref().unwrap_or("RUB"),
        record.id,
    )
}

fn admin_text(record: &PaymentRecord) -> String {
    format!(
        "✅ Оплата успешна\nID: {}\nСумма: {} {}\nОписание: {}\nОт: {}\nВид: {}",
        record.id,
        record.amount.as_deref().unwrap_or("0.00"),
        record.currency.as_deref().unwrap_or("RUB"),
        record.description.as_deref().unwrap_or(""),
        record.recipient().unwrap_or_else(|| "-".to_string()),
        record.kind().unwrap_or_else(|| "-".to_string()),
    )
}
