//! Scripted [`Transport`] double for poller and webhook tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tgbot_core::{BotError, InputFile, Result, Transport, Update, WebhookInfo};
use tgbot_core::{Chat, Message, User};

/// Transport double: serves a scripted sequence of `getUpdates` results and
/// records the offsets it was polled with. Once the script is exhausted,
/// `get_updates` hangs like a real long poll with no traffic, so stop/cancel
/// paths get exercised.
#[derive(Default)]
pub struct MockTransport {
    batches: Mutex<VecDeque<Result<Vec<Update>>>>,
    offsets: Mutex<Vec<i64>>,
    webhook_url: Mutex<String>,
    set_webhook_calls: AtomicUsize,
    delete_webhook_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batches(batches: Vec<Result<Vec<Update>>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            ..Self::default()
        }
    }

    /// Simulates a webhook already registered with the remote service.
    pub fn with_registered_webhook(url: &str) -> Self {
        Self {
            webhook_url: Mutex::new(url.to_string()),
            ..Self::default()
        }
    }

    /// Offsets observed by `get_updates`, in call order.
    pub fn observed_offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }

    pub fn set_webhook_calls(&self) -> usize {
        self.set_webhook_calls.load(Ordering::SeqCst)
    }

    pub fn delete_webhook_calls(&self) -> usize {
        self.delete_webhook_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn invoke(&self, method: &str, _params: &[(&str, String)]) -> Result<Value> {
        Err(BotError::Transport(format!("{} not scripted", method)))
    }

    async fn invoke_with_files(
        &self,
        method: &str,
        _params: &[(&str, String)],
        _files: &[InputFile],
    ) -> Result<Value> {
        Err(BotError::Transport(format!("{} not scripted", method)))
    }

    async fn get_updates(
        &self,
        offset: i64,
        _limit: u32,
        _timeout_secs: u64,
    ) -> Result<Vec<Update>> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                // Script exhausted: behave like a long poll that never
                // produces updates until the caller cancels.
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    async fn set_webhook(&self, url: &str, _certificate: Option<&InputFile>) -> Result<()> {
        self.set_webhook_calls.fetch_add(1, Ordering::SeqCst);
        *self.webhook_url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<()> {
        self.delete_webhook_calls.fetch_add(1, Ordering::SeqCst);
        self.webhook_url.lock().unwrap().clear();
        Ok(())
    }

    async fn get_webhook_info(&self) -> Result<WebhookInfo> {
        Ok(WebhookInfo {
            url: self.webhook_url.lock().unwrap().clone(),
            has_custom_certificate: false,
            pending_update_count: 0,
        })
    }
}

/// A text-message update with the given id.
pub fn text_update(update_id: i64, text: &str) -> Update {
    Update {
        update_id,
        message: Some(Message {
            message_id: update_id,
            from: Some(User {
                id: 123,
                username: Some("test_user".to_string()),
                first_name: Some("Test".to_string()),
                last_name: None,
            }),
            chat: Chat {
                id: 456,
                chat_type: "private".to_string(),
            },
            date: 1_700_000_000,
            text: Some(text.to_string()),
        }),
        edited_message: None,
        callback_query: None,
        inline_query: None,
        chosen_inline_result: None,
        shipping_query: None,
        pre_checkout_query: None,
        poll: None,
        poll_answer: None,
    }
}
