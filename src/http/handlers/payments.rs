use crate::domain::payment::{ErrorEnvelope, ErrorPayload, PurchaseRequest};
use crate::gateway::GatewayError;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

pub async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<PurchaseRequest>,
) -> impl IntoResponse {
    match state.payment_service.start_purchase(req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err) => {
            tracing::error!(%err, "purchase initiation failed");
            let (status, code) = classify(&err);
            let message = match err {
                GatewayError::InvalidRequest(reason) => reason.to_string(),
                _ => "Не удалось подготовить оплату. Попробуйте позже.".to_string(),
            };
            (
                status,
                Json(ErrorEnvelope {
                    error: ErrorPayload {
                        code: code.to_string(),
                        message,
                    },
                }),
            )
                .into_response()
        }
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

fn classify(err: &GatewayError) -> (StatusCode, &'static str) {
    match err {
        GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
        GatewayError::Configuration => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_MISSING"),
        GatewayError::Unreachable(_) => (StatusCode::SERVICE_UNAVAILABLE, "GATEWAY_UNREACHABLE"),
        GatewayError::Rejected { .. } => (StatusCode::BAD_GATEWAY, "GATEWAY_REJECTED"),
        GatewayError::Protocol(_) => (StatusCode::BAD_GATEWAY, "GATEWAY_PROTOCOL"),
    }
}
