use crate::domain::payment::{
    format_amount, PurchaseIntent, PurchaseKind, PurchaseRequest, PurchaseResponse,
};
use crate::gateway::{GatewayError, PaymentGateway};
use std::sync::Arc;

#[derive(Clone)]
pub struct PaymentService {
    pub gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub async fn start_purchase(
        &self,
        req: PurchaseRequest,
    ) -> Result<PurchaseResponse, GatewayError> {
        let intent = build_intent(req)?;
        let confirmation_url = self.gateway.create_payment(&intent).await?;
        Ok(PurchaseResponse {
            confirmation_url,
            amount: format_amount(intent.amount_minor),
            description: intent.description,
        })
    }
}

pub fn build_intent(req: PurchaseRequest) -> Result<PurchaseIntent, GatewayError> {
    let amount_minor = price_for(req.kind, req.sos_pack)
        .ok_or(GatewayError::InvalidRequest("unknown purchase pack"))?;
    Ok(PurchaseIntent {
        amount_minor,
        description: description_for(req.kind, req.sos_pack),
        kind: req.kind,
        tg_id: req.tg_id,
        username: req.username,
        sos_pack: if req.kind == PurchaseKind::Sos {
            req.sos_pack
        } else {
            0
        },
    })
}

// catalog prices in minor units (kopecks)
pub fn price_for(kind: PurchaseKind, sos_pack: i64) -> Option<i64> {
    match kind {
        PurchaseKind::Subscription => Some(79_000),
        PurchaseKind::Sos => match sos_pack {
            50 => Some(9_900),
            100 => Some(15_900),
            500 => Some(34_900),
            1000 => Some(49_900),
            _ => None,
        },
    }
}

pub fn description_for(kind: PurchaseKind, sos_pack: i64) -> String {
    match kind {
        PurchaseKind::Subscription => "NoSmokeBot: курс 30 дней".to_string(),
        PurchaseKind::Sos => format!("NoSmokeBot: SOS +{sos_pack}"),
    }
}
