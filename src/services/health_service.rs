//! Diagnostics
//!
//! Reports how the relay is configured without revealing the gateway
//! secret. The client id is only ever shown as its last four characters.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{Config, GATEWAY_API_VERSION};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub mode: &'static str,
    pub has_credentials: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id_suffix: Option<String>,
    pub base_url: &'static str,
    pub api_version: &'static str,
    pub gateway_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_replay_window_secs: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

pub fn health_report(config: &Config) -> HealthReport {
    let credentials = config.gateway.credentials.as_ref();
    HealthReport {
        status: if credentials.is_some() { "ok" } else { "unconfigured" },
        mode: config.gateway.mode.as_str(),
        has_credentials: credentials.is_some(),
        client_id_suffix: credentials.map(|c| c.client_id_suffix()),
        base_url: config.gateway.base_url(),
        api_version: GATEWAY_API_VERSION,
        gateway_timeout_secs: config.gateway.timeout.as_secs(),
        webhook_replay_window_secs: config.webhook.replay_window.map(|w| w.as_secs()),
        timestamp: Utc::now(),
    }
}
