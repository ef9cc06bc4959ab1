use crate::domain::payment::PaymentUpsert;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

// The provider retries aggressively on non-2xx, so once authenticated the
// answer is always 200: re-delivery cannot fix a bad payload or a failed write.
pub async fn receive(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let raw: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(%err, "unparseable webhook payload");
            return (StatusCode::OK, "ignored");
        }
    };

    let upsert = PaymentUpsert::from_callback(raw);
    tracing::info!(id = %upsert.id, event = ?upsert.event, "webhook received");

    match state.store.upsert_event(&upsert).await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            tracing::error!(id = %upsert.id, %err, "webhook upsert failed");
            (StatusCode::OK, "ignored")
        }
    }
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}
