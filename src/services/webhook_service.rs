//! Webhook authentication
//!
//! The gateway signs every settlement notification with the shared secret:
//!
//! ```text
//! x-webhook-signature = base64(HMAC-SHA256(secret, x-webhook-timestamp ++ raw_body))
//! ```
//!
//! `++` is plain byte concatenation with no separator. The body must be the
//! exact bytes received; a re-serialized JSON value will not verify.
//! Nothing in the body is looked at until the signature has been accepted.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::error::AppError;
use crate::models::WebhookPayload;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";
pub const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";

/// Timestamps above this are taken to be milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Result of authenticating one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Signed by the holder of the shared secret; the body may be parsed.
    Authentic,
    /// Signature or timestamp header missing. No HMAC was computed.
    Malformed,
    /// Signature does not match.
    Rejected,
    /// Correctly signed but outside the configured replay window.
    Stale,
}

pub struct WebhookAuthenticator {
    secret: SecretString,
    replay_window: Option<Duration>,
}

impl WebhookAuthenticator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
            replay_window: None,
        }
    }

    /// Authenticator keyed with the gateway secret, if one is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let credentials = config.gateway.credentials.as_ref()?;
        let authenticator = Self::new(credentials.client_secret.expose_secret());
        Some(match config.webhook.replay_window {
            Some(window) => authenticator.with_replay_window(window),
            None => authenticator,
        })
    }

    /// Reject notifications whose timestamp is further than `window` from now.
    pub fn with_replay_window(mut self, window: Duration) -> Self {
        self.replay_window = Some(window);
        self
    }

    /// Base64 HMAC-SHA256 of `timestamp ++ raw_body`.
    pub fn sign(&self, timestamp: &str, raw_body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.as_bytes());
        mac.update(raw_body);
        STANDARD.encode(mac.finalize().into_bytes())
    }

    pub fn authenticate(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        raw_body: &[u8],
    ) -> Verdict {
        self.authenticate_at(timestamp, signature, raw_body, Utc::now())
    }

    fn authenticate_at(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        raw_body: &[u8],
        now: DateTime<Utc>,
    ) -> Verdict {
        let (Some(timestamp), Some(signature)) = (
            timestamp.filter(|t| !t.is_empty()),
            signature.filter(|s| !s.is_empty()),
        ) else {
            return Verdict::Malformed;
        };

        let expected = self.sign(timestamp, raw_body);
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Verdict::Rejected;
        }

        match self.replay_window {
            Some(window) if !within_window(timestamp, window, now) => Verdict::Stale,
            _ => Verdict::Authentic,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Accepts unix seconds or milliseconds; anything unparseable is outside.
fn within_window(timestamp: &str, window: Duration, now: DateTime<Utc>) -> bool {
    let Ok(raw) = timestamp.trim().parse::<i64>() else {
        return false;
    };
    let millis = if raw.abs() >= MILLIS_THRESHOLD {
        raw
    } else {
        raw.saturating_mul(1000)
    };
    let distance = now.timestamp_millis().saturating_sub(millis).unsigned_abs();
    distance <= window.as_millis() as u64
}

/// Authenticate a notification and, only if authentic, parse its body.
pub fn process_notification(
    authenticator: &WebhookAuthenticator,
    timestamp: Option<&str>,
    signature: Option<&str>,
    raw_body: &[u8],
) -> Result<WebhookPayload, AppError> {
    match authenticator.authenticate(timestamp, signature, raw_body) {
        Verdict::Authentic => {}
        Verdict::Malformed => {
            tracing::warn!(
                has_timestamp = timestamp.is_some(),
                has_signature = signature.is_some(),
                "Webhook missing signature headers"
            );
            return Err(AppError::WebhookRejected("missing signature or timestamp"));
        }
        Verdict::Rejected => {
            tracing::warn!(
                timestamp = timestamp.unwrap_or_default(),
                body_len = raw_body.len(),
                "Webhook signature mismatch"
            );
            return Err(AppError::WebhookRejected("invalid signature"));
        }
        Verdict::Stale => {
            tracing::warn!(
                timestamp = timestamp.unwrap_or_default(),
                "Webhook timestamp outside replay window"
            );
            return Err(AppError::WebhookRejected("stale timestamp"));
        }
    }

    let payload: WebhookPayload = serde_json::from_slice(raw_body).map_err(|e| {
        tracing::warn!(error = %e, "Authentic webhook with unreadable body");
        AppError::bad_request("Invalid webhook payload")
    })?;

    let order_id = payload.data.order.as_ref().map(|o| o.order_id.as_str());
    let payment_status = payload
        .data
        .payment
        .as_ref()
        .and_then(|p| p.payment_status.as_deref());
    tracing::info!(
        event_type = %payload.event_type,
        order_id = order_id.unwrap_or("-"),
        payment_status = payment_status.unwrap_or("-"),
        "Webhook received"
    );

    Ok(payload)
}
