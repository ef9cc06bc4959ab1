use crate::domain::payment::{PaymentRecord, PaymentUpsert, SUCCEEDED_EVENT};
use crate::repo::PaymentStore;
use anyhow::Result;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl PaymentStore for PaymentsRepo {
    async fn upsert_event(&self, upsert: &PaymentUpsert) -> Result<()> {
        // Insert-only columns keep their first-write values; everything the
        // provider may re-deliver is overwritten in the same statement.
        sqlx::query(
            r#"
            INSERT INTO payments (id, event, amount, currency, description, metadata, raw)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                event = EXCLUDED.event,
                amount = EXCLUDED.amount,
                currency = EXCLUDED.currency,
                description = EXCLUDED.description,
                metadata = EXCLUDED.metadata,
                raw = EXCLUDED.raw,
                updated_at = now()
            "#,
        )
        .bind(&upsert.id)
        .bind(&upsert.event)
        .bind(&upsert.amount)
        .bind(&upsert.currency)
        .bind(&upsert.description)
        .bind(&upsert.metadata)
        .bind(&upsert.raw)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_pending_notification(&self, limit: i64) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event, amount, currency, description, metadata, raw,
                   created_at, updated_at, buyer_notified, admin_notified
            FROM payments
            WHERE event = $1 AND (buyer_notified = false OR admin_notified = false)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(SUCCEEDED_EVENT)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PaymentRecord {
                id: r.get("id"),
                event: r.get("event"),
                amount: r.get("amount"),
                currency: r.get("currency"),
                description: r.get("description"),
                metadata: r.get("metadata"),
                raw: r.get("raw"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
                buyer_notified: r.get("buyer_notified"),
                admin_notified: r.get("admin_notified"),
            })
            .collect())
    }

    async fn mark_buyer_notified(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE payments SET buyer_notified = true, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_admin_notified(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE payments SET admin_notified = true, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
