//! Domain models and data structures
//!
//! Request/response bodies for the public API, the payloads exchanged with
//! the payment gateway, and the webhook notification shape. These are
//! "pure" data structures without business logic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order creation request from the browser client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub payment_session_id: String,
    pub order_token: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub environment: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    /// True only when the gateway reports the order as settled.
    pub success: bool,
    pub order_id: String,
    pub order_status: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub order_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_time: Option<String>,
}

/// Query string the gateway appends when returning the payer's browser
#[derive(Debug, Deserialize)]
pub struct PaymentReturnQuery {
    pub order_id: Option<String>,
    pub order_status: Option<String>,
}

/// Order creation payload sent to the gateway
#[derive(Debug, Serialize)]
pub struct GatewayOrderRequest {
    pub order_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub order_amount: Decimal,
    pub order_currency: &'static str,
    pub customer_details: CustomerDetails,
    pub order_meta: OrderMeta,
    pub order_note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub customer_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderMeta {
    pub return_url: String,
    pub notify_url: String,
}

/// Order entity returned by the gateway on create and lookup
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub order_id: String,
    #[serde(default)]
    pub cf_order_id: Option<serde_json::Value>,
    #[serde(default)]
    pub order_status: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub order_amount: Option<Decimal>,
    #[serde(default)]
    pub payment_session_id: Option<String>,
    #[serde(default)]
    pub order_token: Option<String>,
    #[serde(default)]
    pub settlement_time: Option<String>,
}

/// Error body the gateway returns for non-2xx responses
#[derive(Debug, Deserialize)]
pub struct GatewayErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

/// Settlement notification body, parsed only after authentication
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub event_time: Option<String>,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub order: Option<WebhookOrder>,
    #[serde(default)]
    pub payment: Option<WebhookPayment>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookOrder {
    pub order_id: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub order_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayment {
    #[serde(default)]
    pub cf_payment_id: Option<serde_json::Value>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub payment_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
}
