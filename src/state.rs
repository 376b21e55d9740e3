//! Application state management
//!
//! This module defines the state shared by all handlers. Everything in it
//! is read-only after startup; handlers never coordinate with each other.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::cashfree::{CashfreeClient, ClientSetupError};
use crate::infrastructure::gateway::PaymentGateway;
use crate::services::webhook_service::WebhookAuthenticator;

/// Shared application state
///
/// Cheaply cloneable; every field is behind an `Arc`. The gateway and the
/// authenticator are absent when no credentials are configured.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    authenticator: Option<Arc<WebhookAuthenticator>>,
}

impl AppState {
    /// Build state talking to the real gateway.
    pub fn new(config: Config) -> Result<Self, ClientSetupError> {
        let gateway = match config.gateway.credentials.as_ref() {
            Some(credentials) => Some(
                Arc::new(CashfreeClient::new(&config.gateway, credentials)?) as Arc<dyn PaymentGateway>,
            ),
            None => None,
        };
        Ok(Self::with_gateway(config, gateway))
    }

    /// Build state around an arbitrary gateway implementation.
    pub fn with_gateway(config: Config, gateway: Option<Arc<dyn PaymentGateway>>) -> Self {
        let authenticator = WebhookAuthenticator::from_config(&config).map(Arc::new);
        Self {
            config: Arc::new(config),
            gateway,
            authenticator,
        }
    }

    pub fn gateway(&self) -> Result<&dyn PaymentGateway, AppError> {
        self.gateway.as_deref().ok_or(AppError::NotConfigured)
    }

    pub fn authenticator(&self) -> Result<&WebhookAuthenticator, AppError> {
        self.authenticator.as_deref().ok_or(AppError::NotConfigured)
    }
}
