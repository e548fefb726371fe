//! Configuration: bot connection, poller tuning, webhook endpoint. Loaded
//! from env or built in code; all poller knobs have defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use tgbot_core::{BotError, Result};

/// Base config: token, API base URL, log file.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// BOT_TOKEN
    pub token: String,
    /// TELEGRAM_API_URL; default `https://api.telegram.org`
    pub api_url: String,
    /// Log file path
    pub log_file: String,
}

impl BotConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.telegram.org";

    /// Load from environment variables. `token` overrides BOT_TOKEN if
    /// provided. Load .env (dotenvy) before calling this from a binary.
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let token = match token {
            Some(t) => t,
            None => std::env::var("BOT_TOKEN")
                .map_err(|_| BotError::Config("BOT_TOKEN not set".to_string()))?,
        };
        let api_url = std::env::var("TELEGRAM_API_URL")
            .unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string());
        let log_file =
            std::env::var("LOG_FILE").unwrap_or_else(|_| "logs/tgbot.log".to_string());

        Ok(Self {
            token,
            api_url,
            log_file,
        })
    }

    /// Validate config (token non-empty, api_url a valid URL).
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(BotError::Config("bot token is empty".to_string()));
        }
        if reqwest::Url::parse(&self.api_url).is_err() {
            return Err(BotError::Config(format!(
                "TELEGRAM_API_URL is not a valid URL: {}",
                self.api_url
            )));
        }
        Ok(())
    }
}

/// Long-polling tuning. All fields optional with defaults.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Max updates per long-poll batch (1..=100).
    pub limit: u32,
    /// How long the remote side holds a poll open. The transport's request
    /// timeout must exceed this.
    pub timeout_secs: u64,
    /// First offset to poll from; 0 means "no updates acknowledged yet".
    pub initial_offset: i64,
    /// Backoff ceiling between retries after transport failures.
    pub backoff_ceiling_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            timeout_secs: 30,
            initial_offset: 0,
            backoff_ceiling_secs: 64,
        }
    }
}

impl PollerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 || self.limit > 100 {
            return Err(BotError::Config(format!(
                "poll limit must be in 1..=100, got {}",
                self.limit
            )));
        }
        Ok(())
    }
}

/// Webhook endpoint config: the public URL registered with the remote
/// service and the local listener serving it.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Publicly reachable HTTPS URL the remote service will POST to.
    pub public_url: String,
    /// Optional self-signed TLS certificate uploaded on registration.
    pub certificate: Option<PathBuf>,
    /// Local listen address. Port 0 picks a free port (useful in tests).
    pub listen_addr: SocketAddr,
    /// Path of the inbound endpoint.
    pub path: String,
}

impl WebhookConfig {
    pub fn new(public_url: impl Into<String>, listen_addr: SocketAddr) -> Self {
        Self {
            public_url: public_url.into(),
            certificate: None,
            listen_addr,
            path: "/webhook".to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.public_url).is_err() {
            return Err(BotError::Config(format!(
                "webhook public_url is not a valid URL: {}",
                self.public_url
            )));
        }
        if !self.path.starts_with('/') {
            return Err(BotError::Config(format!(
                "webhook path must start with '/', got {}",
                self.path
            )));
        }
        Ok(())
    }
}
