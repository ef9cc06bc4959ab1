use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SUCCEEDED_EVENT: &str = "payment.succeeded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseKind {
    Subscription,
    Sos,
}

impl PurchaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseKind::Subscription => "subscription",
            PurchaseKind::Sos => "sos",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub kind: PurchaseKind,
    pub tg_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub sos_pack: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub confirmation_url: String,
    pub amount: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct PurchaseIntent {
    pub amount_minor: i64,
    pub description: String,
    pub kind: PurchaseKind,
    pub tg_id: String,
    pub username: String,
    pub sos_pack: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub event: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub raw: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub buyer_notified: bool,
    pub admin_notified: bool,
}

impl PaymentRecord {
    // older flows used other metadata keys, and numbers arrive quoted or bare
    pub fn recipient(&self) -> Option<String> {
        let meta = self.metadata.as_ref()?;
        for key in ["tg_id", "tgId", "user_id"] {
            if let Some(v) = meta.get(key) {
                if let Some(s) = v.as_str() {
                    if !s.is_empty() {
                        return Some(s.to_string());
                    }
                } else if let Some(n) = v.as_i64() {
                    return Some(n.to_string());
                }
            }
        }
        None
    }

    pub fn kind(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("kind"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    pub fn is_succeeded(&self) -> bool {
        self.event.as_deref() == Some(SUCCEEDED_EVENT)
    }
}

#[derive(Debug, Clone)]
pub struct PaymentUpsert {
    pub id: String,
    pub event: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub raw: serde_json::Value,
}

impl PaymentUpsert {
    // payloads without `object.id` or a top-level `id` get a synthesized
    // local id so the delivery is still recorded
    pub fn from_callback(raw: serde_json::Value) -> Self {
        let object = raw.get("object");
        let id = object
            .and_then(|o| o.get("id"))
            .or_else(|| raw.get("id"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("local_{}", Utc::now().timestamp_millis()));
        let event = raw.get("event").and_then(|v| v.as_str()).map(str::to_string);
        let amount = object
            .and_then(|o| o.get("amount"))
            .and_then(|a| a.get("value"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let currency = object
            .and_then(|o| o.get("amount"))
            .and_then(|a| a.get("currency"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let description = object
            .and_then(|o| o.get("description"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let metadata = object.and_then(|o| o.get("metadata")).cloned();

        Self {
            id,
            event,
            amount,
            currency,
            description,
            metadata,
            raw,
        }
    }
}

// 79000 -> "790.00"
pub fn format_amount(amount_minor: i64) -> String {
    format!("{}.{:02}", amount_minor / 100, (amount_minor % 100).abs())
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}
