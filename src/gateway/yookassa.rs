use crate::config::AppConfig;
use crate::domain::payment::{format_amount, PurchaseIntent};
use crate::gateway::{GatewayError, PaymentGateway};
use serde_json::{json, Value};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use uuid::Uuid;

const PAYMENTS_PATH: &str = "/v3/payments";

// `api_hosts` candidates are dialed in order while the request URL keeps
// `sni_host`, so TLS SNI and the Host header stay on the canonical provider
// name even when its DNS route is blocked.
pub struct YooKassaGateway {
    pub shop_id: String,
    pub secret_key: String,
    pub return_url: String,
    pub sni_host: String,
    pub api_hosts: Vec<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub use_tls: bool,
}

impl YooKassaGateway {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            shop_id: cfg.shop_id.clone(),
            secret_key: cfg.secret_key.clone(),
            return_url: cfg.return_url.clone(),
            sni_host: cfg.sni_host.clone(),
            api_hosts: cfg.api_hosts.clone(),
            connect_timeout: Duration::from_millis(cfg.connect_timeout_ms),
            request_timeout: Duration::from_millis(cfg.request_timeout_ms),
            use_tls: true,
        }
    }

    pub fn payload(&self, intent: &PurchaseIntent) -> Value {
        json!({
            "amount": { "value": format_amount(intent.amount_minor), "currency": "RUB" },
            "capture": true,
            "confirmation": { "type": "redirect", "return_url": self.return_url },
            "description": intent.description,
            "metadata": {
                "tg_id": intent.tg_id,
                "username": intent.username,
                "kind": intent.kind.as_str(),
                "sos_pack": intent.sos_pack,
                "source": "telegram:/pay"
            }
        })
    }

    async fn send_once(
        &self,
        candidate: &str,
        body: &Value,
        idem_key: &str,
    ) -> anyhow::Result<reqwest::Response> {
        let default_port = if self.use_tls { 443 } else { 80 };
        let (host, port) = split_candidate(candidate, default_port);

        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout);
        if host != self.sni_host {
            let addr = resolve_candidate(&host, port).await?;
            builder = builder.resolve(&self.sni_host, addr);
        }
        let client = builder.build()?;

        let scheme = if self.use_tls { "https" } else { "http" };
        let url = format!("{scheme}://{}:{port}{PAYMENTS_PATH}", self.sni_host);

        let resp = client
            .post(&url)
            .basic_auth(&self.shop_id, Some(&self.secret_key))
            .header("Idempotence-Key", idem_key)
            .json(body)
            .send()
            .await?;

        Ok(resp)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for YooKassaGateway {
    fn name(&self) -> &'static str {
        "yookassa"
    }

    async fn create_payment(&self, intent: &PurchaseIntent) -> Result<String, GatewayError> {
        if self.shop_id.is_empty() || self.secret_key.is_empty() {
            return Err(GatewayError::Configuration);
        }
        if intent.amount_minor <= 0 {
            return Err(GatewayError::InvalidRequest("amount must be positive"));
        }
        if intent.tg_id.is_empty() {
            return Err(GatewayError::InvalidRequest("recipient id is empty"));
        }

        // One idempotency key for the whole invocation: a provider-side
        // retry over a different candidate is still one logical payment.
        let idem_key = Uuid::new_v4().to_string();
        let body = self.payload(intent);

        let mut last_err = String::from("no endpoint candidates configured");
        for candidate in &self.api_hosts {
            match self.send_once(candidate, &body, &idem_key).await {
                Ok(resp) => {
                    // An HTTP response means the provider was reached; the
                    // outcome is final regardless of status.
                    let status = resp.status();
                    if !status.is_success() {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(GatewayError::Rejected {
                            status: status.as_u16(),
                            body: body.chars().take(500).collect(),
                        });
                    }
                    let parsed: Value = resp
                        .json()
                        .await
                        .map_err(|e| GatewayError::Protocol(format!("bad response JSON: {e}")))?;
                    return parsed
                        .pointer("/confirmation/confirmation_url")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| {
                            GatewayError::Protocol("confirmation_url missing".to_string())
                        });
                }
                Err(err) => {
                    tracing::warn!(candidate = %candidate, error = %err, "payment endpoint unreachable");
                    last_err = err.to_string();
                }
            }
        }

        Err(GatewayError::Unreachable(last_err))
    }
}

fn split_candidate(candidate: &str, default_port: u16) -> (String, u16) {
    match candidate.rsplit_once(':') {
        Some((host, port)) => match port.parse::<u16>() {
            Ok(port) => (host.to_string(), port),
            Err(_) => (candidate.to_string(), default_port),
        },
        None => (candidate.to_string(), default_port),
    }
}

async fn resolve_candidate(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }
    let mut addrs = tokio::net::lookup_host((host, port)).await?;
    addrs
        .next()
        .ok_or_else(|| anyhow::anyhow!("no address for {host}"))
}
