//! Transport seam between the dispatch engine and the remote HTTP API.
//!
//! [`Transport`] is transport-agnostic on purpose: production code talks to
//! the real service over HTTP, tests substitute a scripted implementation.
//! The typed helpers the engine consumes (`get_updates`, webhook management)
//! have default implementations on top of `invoke`, so a test double only
//! needs to override the methods it cares about.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{BotError, Result};
use crate::types::{Update, WebhookInfo};

/// A file attached to a request as a multipart part.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Form field name, e.g. `certificate`.
    pub field: String,
    pub path: PathBuf,
}

/// One synchronous RPC against the remote endpoint.
///
/// `invoke` returns the decoded `result` payload of the response envelope;
/// envelope-level failures surface as [`BotError::Api`], network failures as
/// [`BotError::Transport`], and malformed bodies as [`BotError::Decode`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Calls `method` with form parameters and returns the result payload.
    async fn invoke(&self, method: &str, params: &[(&str, String)]) -> Result<Value>;

    /// Like [`Transport::invoke`], with binary file payloads attached as
    /// multipart parts.
    async fn invoke_with_files(
        &self,
        method: &str,
        params: &[(&str, String)],
        files: &[InputFile],
    ) -> Result<Value>;

    /// Long-polls for updates starting at `offset`. The remote side holds
    /// the request open for up to `timeout_secs`, so the underlying request
    /// timeout must exceed it.
    async fn get_updates(&self, offset: i64, limit: u32, timeout_secs: u64) -> Result<Vec<Update>> {
        let params = [
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
            ("timeout", timeout_secs.to_string()),
        ];
        let result = self.invoke("getUpdates", &params).await?;
        serde_json::from_value(result).map_err(|e| BotError::Decode(e.to_string()))
    }

    /// Registers `url` as the webhook endpoint, optionally uploading a
    /// self-signed TLS certificate.
    async fn set_webhook(&self, url: &str, certificate: Option<&InputFile>) -> Result<()> {
        let params = [("url", url.to_string())];
        match certificate {
            Some(cert) => {
                self.invoke_with_files("setWebhook", &params, std::slice::from_ref(cert))
                    .await?;
            }
            None => {
                self.invoke("setWebhook", &params).await?;
            }
        }
        Ok(())
    }

    /// Removes any registered webhook. Idempotent on the remote side.
    async fn delete_webhook(&self) -> Result<()> {
        self.invoke("deleteWebhook", &[]).await?;
        Ok(())
    }

    /// Reports the current webhook registration.
    async fn get_webhook_info(&self) -> Result<WebhookInfo> {
        let result = self.invoke("getWebhookInfo", &[]).await?;
        serde_json::from_value(result).map_err(|e| BotError::Decode(e.to_string()))
    }
}
