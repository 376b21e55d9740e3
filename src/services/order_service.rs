//! Order creation
//!
//! Validates the browser's request, shapes it into a gateway order and
//! classifies whatever the gateway answers. Nothing is stored.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::error::{AppError, mentions_domain};
use crate::infrastructure::gateway::{GatewayError, PaymentGateway};
use crate::models::{CreateOrderRequest, CustomerDetails, GatewayOrderRequest, OrderMeta};

pub const ORDER_CURRENCY: &str = "INR";

const DEFAULT_CUSTOMER_NAME: &str = "Customer";
const DEFAULT_CUSTOMER_EMAIL: &str = "customer@example.com";
const DEFAULT_CUSTOMER_PHONE: &str = "9999999999";

/// A checkout session the browser can open.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order_id: String,
    pub payment_session_id: String,
    pub order_token: Option<String>,
    pub amount: Decimal,
}

/// Why the gateway refused to produce a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamRejection {
    Credentials,
    DomainNotWhitelisted(String),
    Invalid(String),
    /// The gateway answered 2xx but without a session id.
    MissingSession,
}

#[derive(Debug)]
pub enum CreateOrderOutcome {
    Created(CreatedOrder),
    UpstreamRejected(UpstreamRejection),
    TransportFailure(String),
}

impl From<UpstreamRejection> for AppError {
    fn from(rejection: UpstreamRejection) -> Self {
        match rejection {
            UpstreamRejection::Credentials => AppError::GatewayCredentials,
            UpstreamRejection::DomainNotWhitelisted(message) => AppError::DomainNotWhitelisted(message),
            UpstreamRejection::Invalid(message) => AppError::GatewayRejected(message),
            UpstreamRejection::MissingSession => {
                AppError::GatewayRejected("Failed to create order".to_string())
            }
        }
    }
}

/// Create a gateway order for the browser's request.
///
/// `host` is the inbound `Host` header; return and notify URLs point back at
/// it. Input errors are returned before the gateway is contacted.
pub async fn create_order(
    gateway: &dyn PaymentGateway,
    host: Option<&str>,
    request: CreateOrderRequest,
) -> Result<CreateOrderOutcome, AppError> {
    let amount = validate_amount(request.amount)?;
    let host = host
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing Host header"))?;

    let order_id = generate_id("order");
    let upi_id = request.upi_id.unwrap_or_default();
    let payload = GatewayOrderRequest {
        order_id: order_id.clone(),
        order_amount: amount,
        order_currency: ORDER_CURRENCY,
        customer_details: CustomerDetails {
            customer_id: generate_id("customer"),
            customer_name: or_default(request.customer_name, DEFAULT_CUSTOMER_NAME),
            customer_email: or_default(request.customer_email, DEFAULT_CUSTOMER_EMAIL),
            customer_phone: or_default(request.customer_phone, DEFAULT_CUSTOMER_PHONE),
        },
        order_meta: order_meta(host),
        order_note: order_note(&upi_id),
    };

    tracing::info!(%order_id, %amount, "Creating payment order");

    let outcome = match gateway.create_order(&payload).await {
        Ok(order) => match order.payment_session_id.filter(|s| !s.is_empty()) {
            Some(payment_session_id) => CreateOrderOutcome::Created(CreatedOrder {
                order_id: order.order_id,
                payment_session_id,
                order_token: order.order_token,
                amount,
            }),
            None => CreateOrderOutcome::UpstreamRejected(UpstreamRejection::MissingSession),
        },
        Err(err) => classify(err),
    };

    match &outcome {
        CreateOrderOutcome::Created(created) => {
            tracing::info!(order_id = %created.order_id, "Payment order created")
        }
        CreateOrderOutcome::UpstreamRejected(reason) => {
            tracing::warn!(%order_id, ?reason, "Gateway rejected order")
        }
        CreateOrderOutcome::TransportFailure(reason) => {
            tracing::error!(%order_id, %reason, "Gateway unreachable while creating order")
        }
    }

    Ok(outcome)
}

fn classify(err: GatewayError) -> CreateOrderOutcome {
    match err {
        GatewayError::Unauthorized { .. } => {
            CreateOrderOutcome::UpstreamRejected(UpstreamRejection::Credentials)
        }
        GatewayError::InvalidRequest { message, .. } if mentions_domain(&message) => {
            CreateOrderOutcome::UpstreamRejected(UpstreamRejection::DomainNotWhitelisted(message))
        }
        GatewayError::InvalidRequest { message, .. } | GatewayError::Upstream { message, .. } => {
            CreateOrderOutcome::UpstreamRejected(UpstreamRejection::Invalid(message))
        }
        GatewayError::InvalidResponse(_) => {
            CreateOrderOutcome::UpstreamRejected(UpstreamRejection::MissingSession)
        }
        err @ (GatewayError::Timeout | GatewayError::Connect(_)) => {
            CreateOrderOutcome::TransportFailure(err.to_string())
        }
    }
}

fn validate_amount(amount: Option<Decimal>) -> Result<Decimal, AppError> {
    match amount {
        None => Err(AppError::bad_request("Amount is required")),
        Some(amount) if amount <= Decimal::ZERO => {
            Err(AppError::bad_request("Amount must be a positive number"))
        }
        Some(amount) => Ok(amount),
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn order_note(upi_id: &str) -> String {
    let upi_id = upi_id.trim();
    if upi_id.is_empty() {
        "UPI payment".to_string()
    } else {
        format!("UPI payment from {upi_id}")
    }
}

/// `<prefix>_<unix millis>_<64 random bits in hex>`
pub fn generate_id(prefix: &str) -> String {
    format!(
        "{prefix}_{}_{:016x}",
        Utc::now().timestamp_millis(),
        rand::random::<u64>()
    )
}

/// Return and notify URLs pointing back at the host that served the request.
///
/// `{order_id}` and `{order_status}` are filled in by the gateway.
pub fn order_meta(host: &str) -> OrderMeta {
    let scheme = if is_local_host(host) { "http" } else { "https" };
    OrderMeta {
        return_url: format!(
            "{scheme}://{host}/payment-response?order_id={{order_id}}&order_status={{order_status}}"
        ),
        notify_url: format!("{scheme}://{host}/api/webhook"),
    }
}

/// Whether `host` (optionally with a port) looks like a development address.
pub fn is_local_host(host: &str) -> bool {
    let name = if let Some(rest) = host.strip_prefix('[') {
        rest.split(']').next().unwrap_or(rest)
    } else {
        host.rsplit_once(':').map_or(host, |(name, _)| name)
    };
    let name = name.to_ascii_lowercase();

    name == "localhost"
        || name.ends_with(".localhost")
        || name == "::1"
        || name == "0.0.0.0"
        || name.starts_with("127.")
        || name.starts_with("10.")
        || name.starts_with("192.168.")
}
