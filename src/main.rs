use nosmoke_payments::config::AppConfig;
use nosmoke_payments::gateway::yookassa::YooKassaGateway;
use nosmoke_payments::http::middleware::basic_auth::WebhookAuth;
use nosmoke_payments::notify::telegram::TelegramChannel;
use nosmoke_payments::repo::payments_repo::PaymentsRepo;
use nosmoke_payments::repo::PaymentStore;
use nosmoke_payments::service::notifier::PaymentsNotifier;
use nosmoke_payments::service::payment_service::PaymentService;
use nosmoke_payments::{build_router, AppState};
use sqlx::postgres::PgPoolOptions;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let store: Arc<dyn PaymentStore> = Arc::new(PaymentsRepo { pool });
    let gateway = Arc::new(YooKassaGateway::from_config(&cfg));
    let channel = Arc::new(TelegramChannel::new(cfg.bot_token.clone()));

    let notifier = Arc::new(PaymentsNotifier {
        store: store.clone(),
        channel,
        admin_tg_id: cfg.admin_tg_id.clone(),
        alert: cfg.alert_payments,
        quiet: cfg.quiet,
        poll_interval: Duration::from_millis(cfg.poll_interval_ms),
        batch_size: cfg.notify_batch_size,
        busy: AtomicBool::new(false),
    });
    tokio::spawn(notifier.run());

    let state = AppState {
        payment_service: PaymentService { gateway },
        store,
    };
    let app = build_router(
        state,
        WebhookAuth {
            login: cfg.webhook_login.clone(),
            password: cfg.webhook_password.clone(),
        },
    );

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
