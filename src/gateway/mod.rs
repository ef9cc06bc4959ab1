use crate::domain::payment::PurchaseIntent;

pub mod mock;
pub mod yookassa;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("payment provider credentials are not configured")]
    Configuration,
    #[error("invalid purchase request: {0}")]
    InvalidRequest(&'static str),
    #[error("no payment endpoint reachable: {0}")]
    Unreachable(String),
    #[error("provider rejected payment: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("provider protocol violation: {0}")]
    Protocol(String),
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_payment(&self, intent: &PurchaseIntent) -> Result<String, GatewayError>;
}
