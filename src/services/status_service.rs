//! Payment status verification

use crate::error::AppError;
use crate::infrastructure::gateway::PaymentGateway;
use crate::models::{VerifyPaymentRequest, VerifyPaymentResponse};

/// The only gateway order status that means funds were received.
pub const SETTLED_STATUS: &str = "PAID";

/// Exact match; unknown or future statuses count as not settled.
pub fn is_settled(order_status: &str) -> bool {
    order_status == SETTLED_STATUS
}

/// Look the order up at the gateway and report whether it is settled.
pub async fn verify_payment(
    gateway: &dyn PaymentGateway,
    request: VerifyPaymentRequest,
) -> Result<VerifyPaymentResponse, AppError> {
    let order_id = request
        .order_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("Order ID is required"))?;

    let order = gateway.fetch_order(&order_id).await.map_err(|err| {
        if err.is_transport() {
            tracing::error!(%order_id, error = %err, "Gateway unreachable while verifying payment");
        }
        AppError::from(err)
    })?;

    let success = is_settled(&order.order_status);
    tracing::info!(
        %order_id,
        order_status = %order.order_status,
        settled = success,
        "Payment status verified"
    );

    Ok(VerifyPaymentResponse {
        success,
        order_id: order.order_id,
        order_status: order.order_status,
        order_amount: order.order_amount,
        settlement_time: order.settlement_time,
    })
}
