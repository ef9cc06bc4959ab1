use std::sync::Arc;

pub mod config;
pub mod domain {
    pub mod payment;
}
pub mod gateway;
pub mod http {
    pub mod handlers {
        pub mod payments;
        pub mod webhook;
    }
    pub mod middleware {
        pub mod basic_auth;
    }
}
pub mod notify;
pub mod repo;
pub mod service {
    pub mod notifier;
    pub mod payment_service;
}

pub const WEBHOOK_PATH: &str = "/yk-webhook";

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub store: Arc<dyn repo::PaymentStore>,
}

pub fn build_router(
    state: AppState,
    auth: http::middleware::basic_auth::WebhookAuth,
) -> axum::Router {
    use axum::middleware::from_fn_with_state;
    use axum::routing::{get, post};

    let webhook_routes = axum::Router::new()
        .route(
            WEBHOOK_PATH,
            post(http::handlers::webhook::receive).fallback(http::handlers::webhook::not_found),
        )
        .layer(from_fn_with_state(
            auth,
            http::middleware::basic_auth::require_basic_auth,
        ));

    axum::Router::new()
        .route("/health", get(http::handlers::payments::health))
        .route("/payments", post(http::handlers::payments::create_payment))
        .merge(webhook_routes)
        .fallback(http::handlers::webhook::not_found)
        .with_state(state)
}
