use nosmoke_payments::domain::payment::PaymentUpsert;
use nosmoke_payments::notify::mock::MockChannel;
use nosmoke_payments::repo::memory::MemoryStore;
use nosmoke_payments::repo::PaymentStore;
use nosmoke_payments::service::notifier::PaymentsNotifier;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn notifier(
    store: Arc<MemoryStore>,
    channel: Arc<MockChannel>,
    admin_tg_id: &str,
    alert: bool,
    quiet: bool,
) -> PaymentsNotifier {
    PaymentsNotifier {
        store,
        channel,
        admin_tg_id: admin_tg_id.to_string(),
        alert,
        quiet,
        poll_interval: Duration::from_millis(10),
        batch_size: 20,
        busy: AtomicBool::new(false),
    }
}

fn callback(id: &str, event: &str, tg_id: serde_json::Value) -> serde_json::Value {
    json!({
        "event": event,
        "object": {
            "id": id,
            "amount": { "value": "790.00", "currency": "RUB" },
            "description": "NoSmokeBot: курс 30 дней",
            "metadata": { "tg_id": tg_id, "kind": "subscription" }
        }
    })
}

async fn seed(store: &MemoryStore, payload: serde_json::Value) {
    store
        .upsert_event(&PaymentUpsert::from_callback(payload))
        .await
        .unwrap();
}

#[tokio::test]
async fn buyer_notified_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    seed(&store, callback("pay_1", "payment.succeeded", json!("12345"))).await;

    let notifier = notifier(store.clone(), channel.clone(), "", false, false);
    notifier.tick().await.unwrap();

    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "12345");
    assert!(sent[0].1.contains("790.00"));
    assert!(sent[0].1.contains("pay_1"));
    assert!(store.snapshot()[0].buyer_notified);

    notifier.tick().await.unwrap();
    assert_eq!(channel.sent_count(), 1);
}

#[tokio::test]
async fn unsettled_records_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    seed(
        &store,
        callback("pay_1", "payment.waiting_for_capture", json!("12345")),
    )
    .await;
    seed(&store, callback("pay_2", "payment.canceled", json!("12345"))).await;

    notifier(store.clone(), channel.clone(), "999", true, false)
        .tick()
        .await
        .unwrap();

    assert_eq!(channel.sent_count(), 0);
    assert!(store.snapshot().iter().all(|r| !r.buyer_notified && !r.admin_notified));
}

#[tokio::test]
async fn quiet_mode_marks_without_sending() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    seed(&store, callback("pay_1", "payment.succeeded", json!("12345"))).await;

    notifier(store.clone(), channel.clone(), "999", true, true)
        .tick()
        .await
        .unwrap();

    assert_eq!(channel.sent_count(), 0);
    let record = &store.snapshot()[0];
    assert!(record.buyer_notified);
    assert!(record.admin_notified);
}

#[tokio::test]
async fn failed_send_keeps_flag_and_retries() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    channel.fail.store(true, Ordering::SeqCst);
    seed(&store, callback("pay_1", "payment.succeeded", json!("12345"))).await;

    let notifier = notifier(store.clone(), channel.clone(), "", false, false);
    notifier.tick().await.unwrap();
    assert_eq!(channel.sent_count(), 0);
    assert!(!store.snapshot()[0].buyer_notified);

    channel.fail.store(false, Ordering::SeqCst);
    notifier.tick().await.unwrap();
    assert_eq!(channel.sent_count(), 1);
    assert!(store.snapshot()[0].buyer_notified);
}

#[tokio::test]
async fn failed_pass_retries_both_legs() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    channel.fail.store(true, Ordering::SeqCst);
    seed(&store, callback("pay_1", "payment.succeeded", json!("12345"))).await;

    let notifier = notifier(store.clone(), channel.clone(), "999", true, false);
    notifier.tick().await.unwrap();
    assert_eq!(channel.sent_count(), 0);
    let record = &store.snapshot()[0];
    assert!(!record.buyer_notified);
    assert!(!record.admin_notified);

    channel.fail.store(false, Ordering::SeqCst);
    notifier.tick().await.unwrap();
    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "12345");
    assert_eq!(sent[1].0, "999");
    let record = &store.snapshot()[0];
    assert!(record.buyer_notified);
    assert!(record.admin_notified);
}

#[tokio::test]
async fn admin_alert_goes_to_operator_once() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    seed(&store, callback("pay_1", "payment.succeeded", json!("12345"))).await;

    let notifier = notifier(store.clone(), channel.clone(), "999", true, false);
    notifier.tick().await.unwrap();
    notifier.tick().await.unwrap();

    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "12345");
    assert_eq!(sent[1].0, "999");
    assert!(sent[1].1.contains("subscription"));
    let record = &store.snapshot()[0];
    assert!(record.buyer_notified);
    assert!(record.admin_notified);
}

#[tokio::test]
async fn alert_disabled_skips_operator_leg() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    seed(&store, callback("pay_1", "payment.succeeded", json!("12345"))).await;

    notifier(store.clone(), channel.clone(), "999", false, false)
        .tick()
        .await
        .unwrap();

    assert_eq!(channel.sent_count(), 1);
    let record = &store.snapshot()[0];
    assert!(record.buyer_notified);
    assert!(!record.admin_notified);
}

#[tokio::test]
async fn missing_recipient_still_alerts_operator() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    seed(
        &store,
        json!({
            "event": "payment.succeeded",
            "object": {
                "id": "pay_1",
                "amount": { "value": "99.00", "currency": "RUB" },
                "description": "NoSmokeBot: SOS +50",
                "metadata": { "kind": "sos" }
            }
        }),
    )
    .await;

    notifier(store.clone(), channel.clone(), "999", true, false)
        .tick()
        .await
        .unwrap();

    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "999");
    let record = &store.snapshot()[0];
    assert!(!record.buyer_notified);
    assert!(record.admin_notified);
}

#[tokio::test]
async fn numeric_recipient_id_is_accepted() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    seed(&store, callback("pay_1", "payment.succeeded", json!(12345))).await;

    notifier(store.clone(), channel.clone(), "", false, false)
        .tick()
        .await
        .unwrap();

    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "12345");
}

#[tokio::test]
async fn tick_in_flight_is_not_overlapped() {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(MockChannel::new());
    seed(&store, callback("pay_1", "payment.succeeded", json!("12345"))).await;

    let notifier = notifier(store.clone(), channel.clone(), "", false, false);
    notifier.busy.store(true, Ordering::SeqCst);
    notifier.tick().await.unwrap();
    assert_eq!(channel.sent_count(), 0);

    notifier.busy.store(false, Ordering::SeqCst);
    notifier.tick().await.unwrap();
    assert_eq!(channel.sent_count(), 1);
}
