//! HTTP transport against the remote bot API.
//!
//! [`ApiClient`] posts form-encoded requests to `{base}/bot{token}/{method}`
//! and decodes the `{ok, result, error_code, description}` envelope. The
//! base URL is configurable so tests can point it at a local mock server.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tgbot_core::{BotError, InputFile, Message, Result, Transport, Update, User};

/// Request timeout for ordinary calls. Long polls get a per-request timeout
/// derived from the poll timeout instead, so they are never cut short by
/// this value.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Headroom added on top of the long-poll timeout for the round trip itself.
const LONG_POLL_MARGIN: Duration = Duration::from_secs(10);

/// Response envelope shared by every API method.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    result: Option<Value>,
    error_code: Option<i64>,
    description: Option<String>,
}

/// Reqwest-backed [`Transport`] implementation.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Creates a client against the public API endpoint.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, crate::config::BotConfig::DEFAULT_API_URL)
    }

    /// Creates a client against a custom base URL (self-hosted API server or
    /// a test mock).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn decode(response: reqwest::Response) -> Result<Value> {
        let body = response
            .bytes()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        let envelope: ApiResponse =
            serde_json::from_slice(&body).map_err(|e| BotError::Decode(e.to_string()))?;
        if !envelope.ok {
            return Err(BotError::Api {
                code: envelope.error_code.unwrap_or(0),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }
        envelope
            .result
            .ok_or_else(|| BotError::Decode("response envelope missing result".to_string()))
    }

    /// Returns basic information about the bot account.
    pub async fn get_me(&self) -> Result<User> {
        let result = self.invoke("getMe", &[]).await?;
        serde_json::from_value(result).map_err(|e| BotError::Decode(e.to_string()))
    }

    /// Sends a text message to `chat_id`.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        options: &SendMessageOptions,
    ) -> Result<Message> {
        let mut params = vec![
            ("chat_id", chat_id.to_string()),
            ("text", text.to_string()),
        ];
        options.apply(&mut params);
        let result = self.invoke("sendMessage", &params).await?;
        serde_json::from_value(result).map_err(|e| BotError::Decode(e.to_string()))
    }

    /// Acknowledges a callback query, optionally showing `text` to the user.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<()> {
        let mut params = vec![("callback_query_id", callback_query_id.to_string())];
        if let Some(text) = text {
            params.push(("text", text.to_string()));
        }
        self.invoke("answerCallbackQuery", &params).await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn invoke(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        let response = self
            .http
            .post(self.method_url(method))
            .form(params)
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    async fn invoke_with_files(
        &self,
        method: &str,
        params: &[(&str, String)],
        files: &[InputFile],
    ) -> Result<Value> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in params {
            form = form.text(name.to_string(), value.clone());
        }
        for file in files {
            let bytes = tokio::fs::read(&file.path).await?;
            let file_name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.field.clone());
            form = form.part(
                file.field.clone(),
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );
        }
        let response = self
            .http
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    /// Overridden to stretch the request timeout past the long-poll hold
    /// time; the client-wide default would cut long polls short.
    async fn get_updates(&self, offset: i64, limit: u32, timeout_secs: u64) -> Result<Vec<Update>> {
        let params = [
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
            ("timeout", timeout_secs.to_string()),
        ];
        let response = self
            .http
            .post(self.method_url("getUpdates"))
            .form(&params)
            .timeout(Duration::from_secs(timeout_secs) + LONG_POLL_MARGIN)
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        let result = Self::decode(response).await?;
        serde_json::from_value(result).map_err(|e| BotError::Decode(e.to_string()))
    }
}

/// Options for [`ApiClient::send_message`]. Each field maps to one request
/// parameter; `Default` sends a plain message.
#[derive(Debug, Clone, Default)]
pub struct SendMessageOptions {
    /// `parse_mode`: how the service renders the text.
    pub parse_mode: Option<ParseMode>,
    /// `disable_notification`: deliver silently.
    pub disable_notification: bool,
    /// `disable_web_page_preview`: no link preview.
    pub disable_web_page_preview: bool,
    /// `reply_to_message_id`: send as a reply to this message.
    pub reply_to_message_id: Option<i64>,
}

/// Text rendering mode for outgoing messages.
#[derive(Debug, Clone, Copy)]
pub enum ParseMode {
    Html,
    Markdown,
}

impl ParseMode {
    fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
            ParseMode::Markdown => "Markdown",
        }
    }
}

impl SendMessageOptions {
    fn apply(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(mode) = self.parse_mode {
            params.push(("parse_mode", mode.as_str().to_string()));
        }
        if self.disable_notification {
            params.push(("disable_notification", "true".to_string()));
        }
        if self.disable_web_page_preview {
            params.push(("disable_web_page_preview", "true".to_string()));
        }
        if let Some(id) = self.reply_to_message_id {
            params.push(("reply_to_message_id", id.to_string()));
        }
    }
}
