//! Error types and their HTTP representation

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::infrastructure::gateway::GatewayError;

/// Errors surfaced to API callers.
///
/// Every variant is terminal for the request; the relay never retries.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Payment gateway credentials are not configured")]
    NotConfigured,

    #[error("Payment gateway rejected the configured credentials")]
    GatewayCredentials,

    #[error("Domain not whitelisted with the payment gateway")]
    DomainNotWhitelisted(String),

    #[error("{0}")]
    GatewayRejected(String),

    #[error("Unable to reach the payment gateway")]
    GatewayUnreachable(String),

    #[error("Webhook rejected: {0}")]
    WebhookRejected(&'static str),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::WebhookRejected(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured
            | Self::GatewayCredentials
            | Self::DomainNotWhitelisted(_)
            | Self::GatewayRejected(_)
            | Self::GatewayUnreachable(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Operator-facing hint attached to the response body.
    fn details(&self) -> Option<String> {
        match self {
            Self::NotConfigured => Some(
                "Set CASHFREE_APP_ID and CASHFREE_SECRET_KEY and restart the server".to_string(),
            ),
            Self::GatewayCredentials => Some(
                "Check CASHFREE_APP_ID, CASHFREE_SECRET_KEY and CASHFREE_MODE match the same environment"
                    .to_string(),
            ),
            Self::DomainNotWhitelisted(message) => Some(format!(
                "Whitelist this domain in the payment gateway dashboard ({message})"
            )),
            Self::GatewayUnreachable(reason) => Some(format!(
                "Check network connectivity to the payment gateway ({reason})"
            )),
            _ => None,
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized { .. } => Self::GatewayCredentials,
            GatewayError::InvalidRequest { message, .. } if mentions_domain(&message) => {
                Self::DomainNotWhitelisted(message)
            }
            GatewayError::InvalidRequest { message, .. } => Self::GatewayRejected(message),
            GatewayError::Upstream { message, .. } => Self::GatewayRejected(message),
            GatewayError::Timeout => Self::GatewayUnreachable("request timed out".to_string()),
            GatewayError::Connect(reason) => Self::GatewayUnreachable(reason),
            GatewayError::InvalidResponse(reason) => Self::Internal(reason),
        }
    }
}

/// Gateway 400 messages about unregistered return/notify domains.
pub(crate) fn mentions_domain(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("domain") || lower.contains("whitelist")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}
