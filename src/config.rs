//! Process configuration
//!
//! Everything the relay needs is read from the environment exactly once at
//! startup and passed down explicitly. Nothing below the binary entry point
//! reads environment variables on its own.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Header value the gateway uses to pin its API contract.
pub const GATEWAY_API_VERSION: &str = "2023-08-01";

const SANDBOX_BASE_URL: &str = "https://sandbox.cashfree.com/pg";
const PRODUCTION_BASE_URL: &str = "https://api.cashfree.com/pg";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Which of the two fixed gateway environments to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayMode {
    #[default]
    Sandbox,
    Production,
}

impl GatewayMode {
    /// Anything that is not clearly "live" falls back to the sandbox.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" | "live" => Self::Production,
            _ => Self::Sandbox,
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

/// Gateway client id and shared secret.
///
/// The secret authenticates outbound calls and is also the HMAC key for
/// inbound webhooks.
#[derive(Debug)]
pub struct GatewayCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl GatewayCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Last four characters of the client id, for diagnostics.
    pub fn client_id_suffix(&self) -> String {
        let chars: Vec<char> = self.client_id.chars().collect();
        let start = chars.len().saturating_sub(4);
        chars[start..].iter().collect()
    }
}

#[derive(Debug)]
pub struct GatewayConfig {
    pub mode: GatewayMode,
    /// `None` leaves the relay running but unable to create or verify payments.
    pub credentials: Option<GatewayCredentials>,
    /// Applied to every outbound gateway call.
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn base_url(&self) -> &'static str {
        self.mode.base_url()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory containing the front-end `index.html`.
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

#[derive(Debug, Clone, Default)]
pub struct WebhookConfig {
    /// Maximum distance between a notification's timestamp and now.
    /// Unset means timestamps are only used as signature input.
    pub replay_window: Option<Duration>,
}

#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub webhook: WebhookConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                static_dir: PathBuf::from("public"),
            },
            gateway: GatewayConfig {
                mode: GatewayMode::Sandbox,
                credentials: None,
                timeout: Duration::from_secs(10),
            },
            webhook: WebhookConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.server.host = host;
        }
        if let Some(port) = get("PORT") {
            config.server.port = parse_number("PORT", &port)?;
        }
        if let Some(dir) = get("STATIC_DIR") {
            config.server.static_dir = PathBuf::from(dir);
        }

        if let Some(mode) = get("CASHFREE_MODE") {
            config.gateway.mode = GatewayMode::parse(&mode);
        }
        if let Some(secs) = get("GATEWAY_TIMEOUT_SECS") {
            let secs: u64 = parse_number("GATEWAY_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "GATEWAY_TIMEOUT_SECS",
                    value: secs.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.gateway.timeout = Duration::from_secs(secs);
        }
        config.gateway.credentials = match (get("CASHFREE_APP_ID"), get("CASHFREE_SECRET_KEY")) {
            (Some(id), Some(secret)) => Some(GatewayCredentials::new(id, secret)),
            _ => None,
        };

        if let Some(secs) = get("WEBHOOK_TOLERANCE_SECS") {
            let secs: u64 = parse_number("WEBHOOK_TOLERANCE_SECS", &secs)?;
            config.webhook.replay_window = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn has_credentials(&self) -> bool {
        self.gateway.credentials.is_some()
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
