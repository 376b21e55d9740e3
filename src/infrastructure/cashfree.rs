//! Cashfree PG client
//!
//! Implements [`PaymentGateway`] over the gateway's REST API. Every call is
//! authenticated with the client id/secret headers and pinned to
//! [`GATEWAY_API_VERSION`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, InvalidHeaderValue};
use secrecy::ExposeSecret;
use url::Url;

use super::gateway::{GatewayError, PaymentGateway};
use super::http_client;
use crate::config::{GATEWAY_API_VERSION, GatewayConfig, GatewayCredentials};
use crate::models::{GatewayErrorBody, GatewayOrder, GatewayOrderRequest};

#[derive(Debug, thiserror::Error)]
pub enum ClientSetupError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid gateway base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("credentials contain characters not allowed in HTTP headers")]
    Header(#[from] InvalidHeaderValue),
}

pub struct CashfreeClient {
    client: reqwest::Client,
    base_url: Url,
    headers: HeaderMap,
}

impl CashfreeClient {
    pub fn new(
        gateway: &GatewayConfig,
        credentials: &GatewayCredentials,
    ) -> Result<Self, ClientSetupError> {
        let client = http_client::build_client(gateway.timeout)?;
        let base_url = Url::parse(gateway.base_url())?;
        let headers = http_client::header_map(&[
            ("x-client-id", credentials.client_id.as_str()),
            ("x-client-secret", credentials.client_secret.expose_secret()),
            ("x-api-version", GATEWAY_API_VERSION),
            ("accept", "application/json"),
        ])?;

        Ok(Self {
            client,
            base_url,
            headers,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl PaymentGateway for CashfreeClient {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let url = self.endpoint(&["orders"]);
        tracing::debug!(order_id = %request.order_id, %url, "Creating gateway order");

        let response =
            http_client::post_json(&self.client, url.as_str(), self.headers.clone(), request).await?;
        read_order(response).await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError> {
        let url = self.endpoint(&["orders", order_id]);
        tracing::debug!(%order_id, %url, "Fetching gateway order");

        let response = http_client::get(&self.client, url.as_str(), self.headers.clone()).await?;
        read_order(response).await
    }
}

async fn read_order(response: reqwest::Response) -> Result<GatewayOrder, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let err = classify_failure(status.as_u16(), &body);
    tracing::warn!(status = status.as_u16(), error = %err, "Gateway call failed");
    Err(err)
}

/// Map a non-2xx gateway response onto [`GatewayError`].
fn classify_failure(status: u16, body: &str) -> GatewayError {
    let parsed = serde_json::from_str::<GatewayErrorBody>(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.clone());
    let message = parsed
        .map(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("gateway responded with HTTP {status}"));

    match status {
        401 | 403 => GatewayError::Unauthorized { status, message },
        400 => GatewayError::InvalidRequest { message, code },
        _ => GatewayError::Upstream { status, message },
    }
}
