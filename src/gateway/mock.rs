use crate::domain::payment::PurchaseIntent;
use crate::gateway::{GatewayError, PaymentGateway};

pub struct MockGateway {
    pub behavior: String,
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_payment(&self, intent: &PurchaseIntent) -> Result<String, GatewayError> {
        if intent.amount_minor <= 0 {
            return Err(GatewayError::InvalidRequest("amount must be positive"));
        }
        if intent.tg_id.is_empty() {
            return Err(GatewayError::InvalidRequest("recipient id is empty"));
        }

        match self.behavior.as_str() {
            "ALWAYS_REJECT" => Err(GatewayError::Rejected {
                status: 400,
                body: "mock decline".to_string(),
            }),
            "ALWAYS_UNREACHABLE" => {
                Err(GatewayError::Unreachable("mock connect failed".to_string()))
            }
            _ => Ok(format!(
                "https://mock.invalid/confirm/{}",
                uuid::Uuid::new_v4()
            )),
        }
    }
}
