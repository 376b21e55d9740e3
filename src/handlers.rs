//! HTTP request handlers
//!
//! This module contains all the HTTP endpoint handlers. Each handler is responsible
//! for extracting data from HTTP requests, calling the appropriate services, and
//! returning HTTP responses.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::Redirect,
};

use crate::error::AppError;
use crate::models::*;
use crate::services::order_service::{self, CreateOrderOutcome};
use crate::services::webhook_service::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::services::{health_service, status_service};
use crate::state::AppState;

/// Status placed in the redirect when the gateway did not send one.
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

/// Create a payment order and return its checkout session
///
/// Return and notify URLs are derived from the `Host` header of this request.
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let gateway = state.gateway()?;
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());

    match order_service::create_order(gateway, host, request).await? {
        CreateOrderOutcome::Created(created) => Ok(Json(CreateOrderResponse {
            success: true,
            order_id: created.order_id,
            payment_session_id: created.payment_session_id,
            order_token: created.order_token,
            amount: created.amount,
            environment: state.config.gateway.mode.as_str(),
        })),
        CreateOrderOutcome::UpstreamRejected(reason) => Err(reason.into()),
        CreateOrderOutcome::TransportFailure(reason) => Err(AppError::GatewayUnreachable(reason)),
    }
}

/// Report whether an order has been paid
pub async fn verify_payment(
    State(state): State<AppState>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let response = status_service::verify_payment(state.gateway()?, request).await?;
    Ok(Json(response))
}

/// Receive a settlement notification from the gateway
///
/// The body is taken as raw bytes: the signature covers the exact payload.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let authenticator = state.authenticator()?;
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok());
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    webhook_service::process_notification(authenticator, timestamp, signature, &body)?;
    Ok(Json(WebhookAck { success: true }))
}

/// Browser return from the gateway's checkout page
///
/// Redirects to the front-end with the order id and status in the query.
/// The status is untrusted; the front-end re-verifies it.
pub async fn payment_response(Query(params): Query<PaymentReturnQuery>) -> Redirect {
    let order_id = params.order_id.unwrap_or_default();
    let status = params
        .order_status
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("order_id", &order_id)
        .append_pair("status", &status)
        .finish();

    tracing::info!(%order_id, %status, "Payer returned from checkout");
    Redirect::to(&format!("/?{query}"))
}

/// Configuration diagnostics
pub async fn health(State(state): State<AppState>) -> Json<health_service::HealthReport> {
    Json(health_service::health_report(&state.config))
}
