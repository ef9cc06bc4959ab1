//! The full pipeline over the in-memory store: purchase initiation, webhook
//! settlement (delivered twice), and two dispatcher ticks producing exactly
//! one buyer message.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::Engine;
use nosmoke_payments::gateway::mock::MockGateway;
use nosmoke_payments::http::middleware::basic_auth::WebhookAuth;
use nosmoke_payments::notify::mock::MockChannel;
use nosmoke_payments::repo::memory::MemoryStore;
use nosmoke_payments::service::notifier::PaymentsNotifier;
use nosmoke_payments::service::payment_service::PaymentService;
use nosmoke_payments::{build_router, AppState, WEBHOOK_PATH};
use serde_json::json;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn subscription_payment_flows_end_to_end() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());

    let app = build_router(
        AppState {
            payment_service: PaymentService {
                gateway: Arc::new(MockGateway {
                    behavior: String::new(),
                }),
            },
            store: store.clone(),
        },
        WebhookAuth {
            login: "yk_user".to_string(),
            password: "super-secret".to_string(),
        },
    );

    let notifier = PaymentsNotifier {
        store: store.clone(),
        channel: channel.clone(),
        admin_tg_id: String::new(),
        alert: false,
        quiet: false,
        poll_interval: Duration::from_millis(10),
        batch_size: 20,
        busy: AtomicBool::new(false),
    };

    // Front end starts the purchase and gets a redirect URL.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/payments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "kind": "subscription", "tg_id": "12345" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Provider settles and delivers the webhook twice.
    let callback = json!({
        "event": "payment.succeeded",
        "object": {
            "id": "pay_1",
            "amount": { "value": "790.00", "currency": "RUB" },
            "description": "NoSmokeBot: курс 30 дней",
            "metadata": { "tg_id": "12345", "kind": "subscription" }
        }
    })
    .to_string();
    let auth = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("yk_user:super-secret")
    );
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(WEBHOOK_PATH)
                    .header(header::AUTHORIZATION, &auth)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(callback.clone()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(store.snapshot().len(), 1);

    // Two ticks, one message.
    notifier.tick().await.unwrap();
    notifier.tick().await.unwrap();

    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "12345");
    assert!(sent[0].1.contains("790.00"));

    let record = &store.snapshot()[0];
    assert_eq!(record.id, "pay_1");
    assert!(record.buyer_notified);
    assert!(!record.admin_notified);
}
