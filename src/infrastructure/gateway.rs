//! Payment gateway abstraction
//!
//! Services depend on [`PaymentGateway`] rather than on a concrete HTTP
//! client, so order creation and status verification can be exercised
//! against an in-memory gateway.

use async_trait::async_trait;

use crate::models::{GatewayOrder, GatewayOrderRequest};

/// Failure of a single outbound gateway call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 401/403: the client id or secret was refused.
    #[error("gateway refused credentials (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// 400: the gateway did not accept the request as sent.
    #[error("gateway rejected request: {message}")]
    InvalidRequest {
        message: String,
        code: Option<String>,
    },

    #[error("gateway returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("gateway request timed out")]
    Timeout,

    /// DNS failure, refused connection, or no response at all.
    #[error("could not reach gateway: {0}")]
    Connect(String),

    #[error("unreadable gateway response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Whether the request never produced a gateway verdict.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Connect(err.to_string())
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register a new order and obtain its checkout session.
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError>;

    /// Look up an order by the id the relay generated for it.
    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError>;
}
