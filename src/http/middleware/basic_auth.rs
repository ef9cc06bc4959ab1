use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;

#[derive(Clone)]
pub struct WebhookAuth {
    pub login: String,
    pub password: String,
}

// Non-POST requests pass through to the 404 fallback; POSTs are rejected
// before the body is parsed.
pub async fn require_basic_auth(
    State(auth): State<WebhookAuth>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| credentials_match(h, &auth))
        .unwrap_or(false);

    if !authorized {
        return Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .body(Body::from("unauthorized"))
            .unwrap_or_else(|_| Response::new(Body::from("unauthorized")));
    }

    next.run(request).await
}

fn credentials_match(header: &str, auth: &WebhookAuth) -> bool {
    let Some(encoded) = header.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(raw) = String::from_utf8(bytes) else {
        return false;
    };
    match raw.split_once(':') {
        Some((login, password)) => login == auth.login && password == auth.password,
        None => false,
    }
}
