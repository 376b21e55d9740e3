//! Router-level tests for the public HTTP surface

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use upi_relay::config::GatewayCredentials;
use upi_relay::infrastructure::gateway::{GatewayError, PaymentGateway};
use upi_relay::models::{GatewayOrder, GatewayOrderRequest};
use upi_relay::services::webhook_service::WebhookAuthenticator;
use upi_relay::{AppState, Config, create_router};

const SECRET: &str = "test-secret";

/// In-memory gateway: every order gets a session, lookups return `status`.
struct FakeGateway {
    status: &'static str,
    fail_with_auth: bool,
    calls: AtomicUsize,
}

impl FakeGateway {
    fn new(status: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            fail_with_auth: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn unauthorized() -> Arc<Self> {
        Arc::new(Self {
            status: "ACTIVE",
            fail_with_auth: true,
            calls: AtomicUsize::new(0),
        })
    }

    fn order(&self, order_id: &str, amount: Option<Decimal>) -> GatewayOrder {
        GatewayOrder {
            order_id: order_id.to_string(),
            cf_order_id: None,
            order_status: self.status.to_string(),
            order_amount: amount,
            payment_session_id: Some(format!("session_{order_id}")),
            order_token: Some("token".to_string()),
            settlement_time: None,
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_with_auth {
            return Err(GatewayError::Unauthorized {
                status: 401,
                message: "authentication Failed".to_string(),
            });
        }
        Ok(self.order(&request.order_id, Some(request.order_amount)))
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.order(order_id, Some(Decimal::new(100, 0))))
    }
}

fn test_config(with_credentials: bool) -> Config {
    let mut config = Config::default();
    config.server.static_dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/public"));
    if with_credentials {
        config.gateway.credentials = Some(GatewayCredentials::new("TESTAPPID1234wxyz", SECRET));
    }
    config
}

fn app_with(gateway: Arc<FakeGateway>) -> Router {
    let state = AppState::with_gateway(test_config(true), Some(gateway as Arc<dyn PaymentGateway>));
    create_router(state)
}

fn unconfigured_app() -> Router {
    create_router(AppState::with_gateway(test_config(false), None))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::HOST, "localhost:3000")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn webhook_request(timestamp: Option<&str>, signature: Option<&str>, body: &'static [u8]) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/api/webhook");
    if let Some(timestamp) = timestamp {
        builder = builder.header("x-webhook-timestamp", timestamp);
    }
    if let Some(signature) = signature {
        builder = builder.header("x-webhook-signature", signature);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_order_returns_session() {
    let gateway = FakeGateway::new("ACTIVE");
    let response = app_with(gateway.clone())
        .oneshot(post_json(
            "/api/create-order",
            json!({"amount": 250.5, "upiId": "payer@okbank", "customerName": "Asha"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["environment"], "sandbox");
    assert_eq!(body["amount"], 250.5);
    let order_id = body["order_id"].as_str().unwrap();
    assert!(order_id.starts_with("order_"));
    assert_eq!(body["payment_session_id"], format!("session_{order_id}"));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_create_order_rejects_non_positive_amount() {
    let gateway = FakeGateway::new("ACTIVE");

    for amount in [json!(0), json!(-5), json!("abc"), Value::Null] {
        let response = app_with(gateway.clone())
            .oneshot(post_json(
                "/api/create-order",
                json!({"amount": amount.clone(), "upiId": "payer@okbank"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "amount {amount}");
        assert_eq!(json_body(response).await["success"], false);
    }

    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_create_order_credential_error() {
    let response = app_with(FakeGateway::unauthorized())
        .oneshot(post_json("/api/create-order", json!({"amount": 10, "upiId": "a@b"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("credentials"));
}

#[tokio::test]
async fn test_unconfigured_server_refuses_payments() {
    let response = unconfigured_app()
        .oneshot(post_json("/api/create-order", json!({"amount": 10, "upiId": "a@b"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = unconfigured_app()
        .oneshot(post_json("/api/verify-payment", json!({"order_id": "order_1"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_verify_payment_paid() {
    let response = app_with(FakeGateway::new("PAID"))
        .oneshot(post_json("/api/verify-payment", json!({"order_id": "order_42"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["order_id"], "order_42");
    assert_eq!(body["order_status"], "PAID");
    assert_eq!(body["order_amount"], 100.0);
}

#[tokio::test]
async fn test_verify_payment_not_settled() {
    let response = app_with(FakeGateway::new("ACTIVE"))
        .oneshot(post_json("/api/verify-payment", json!({"order_id": "order_42"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["order_status"], "ACTIVE");
}

#[tokio::test]
async fn test_verify_payment_requires_order_id() {
    let gateway = FakeGateway::new("PAID");
    let response = app_with(gateway.clone())
        .oneshot(post_json("/api/verify-payment", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_webhook_accepts_signed_body() {
    let body: &'static [u8] =
        br#"{"type":"PAYMENT_SUCCESS_WEBHOOK","data":{"order":{"order_id":"order_1","order_amount":1},"payment":{"payment_status":"SUCCESS"}}}"#;
    let timestamp = "1700000000123";
    let signature = WebhookAuthenticator::new(SECRET).sign(timestamp, body);

    let response = app_with(FakeGateway::new("PAID"))
        .oneshot(webhook_request(Some(timestamp), Some(&signature), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"success": true}));
}

#[tokio::test]
async fn test_webhook_pinned_signature() {
    let body: &'static [u8] = br#"{"type":"PAYMENT_SUCCESS_WEBHOOK"}"#;

    let response = app_with(FakeGateway::new("PAID"))
        .oneshot(webhook_request(
            Some("1700000000123"),
            Some("quFykLoUvk1qE4QAnw6RvP4fQjUNyj0APbfxJjobygk="),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_rejects_forgery() {
    let body: &'static [u8] = br#"{"type":"PAYMENT_SUCCESS_WEBHOOK"}"#;
    let forged = WebhookAuthenticator::new("not-the-secret").sign("1700000000", body);

    let response = app_with(FakeGateway::new("PAID"))
        .oneshot(webhook_request(Some("1700000000"), Some(&forged), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_webhook_rejects_missing_headers() {
    let body: &'static [u8] = br#"{"type":"PAYMENT_SUCCESS_WEBHOOK"}"#;
    let signature = WebhookAuthenticator::new(SECRET).sign("1700000000", body);

    let response = app_with(FakeGateway::new("PAID"))
        .oneshot(webhook_request(None, Some(&signature), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app_with(FakeGateway::new("PAID"))
        .oneshot(webhook_request(Some("1700000000"), None, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_unconfigured() {
    let response = unconfigured_app()
        .oneshot(webhook_request(Some("1"), Some("sig"), b"{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_payment_response_redirects() {
    let response = unconfigured_app()
        .oneshot(
            Request::builder()
                .uri("/payment-response?order_id=order_1&order_status=PAID")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/?order_id=order_1&status=PAID"
    );
}

#[tokio::test]
async fn test_payment_response_defaults_status() {
    let response = unconfigured_app()
        .oneshot(
            Request::builder()
                .uri("/payment-response?order_id=order%201")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/?order_id=order+1&status=UNKNOWN"
    );
}

#[tokio::test]
async fn test_health_hides_secret() {
    for path in ["/api/health", "/api/test"] {
        let response = app_with(FakeGateway::new("PAID"))
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["mode"], "sandbox");
        assert_eq!(body["hasCredentials"], true);
        assert_eq!(body["clientIdSuffix"], "wxyz");
        assert!(!body.to_string().contains(SECRET));
    }
}

#[tokio::test]
async fn test_health_flags_unconfigured() {
    let response = unconfigured_app()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["hasCredentials"], false);
    assert_eq!(body["status"], "unconfigured");
}

#[tokio::test]
async fn test_index_is_served() {
    let response = unconfigured_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("/api/create-order"));
}
