//! UPI Payment Relay Library
//!
//! Relays order creation and status lookups between a browser checkout and
//! the Cashfree payment gateway, and authenticates the gateway's settlement
//! webhooks. The binary in `main.rs` only wires configuration, logging and
//! the listener around [`create_router`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{services::ServeFile, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub use config::Config;
pub use error::AppError;
pub use state::AppState;

use handlers::*;

/// Build the full HTTP surface around `app_state`.
pub fn create_router(app_state: AppState) -> Router {
    let index = ServeFile::new(app_state.config.server.index_path());

    Router::new()
        .route_service("/", index)
        .route("/payment-response", get(payment_response))
        .route("/api/create-order", post(create_order))
        .route("/api/verify-payment", post(verify_payment))
        .route("/api/webhook", post(webhook))
        .route("/api/health", get(health))
        .route("/api/test", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Initialize tracing/logging
///
/// - `RUST_LOG`: log filter (defaults to `info`)
/// - `LOG_JSON`: set to `true` for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
