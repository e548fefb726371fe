//! Long-polling update source.
//!
//! One dedicated task runs the poll loop: fetch a batch, dispatch it in
//! ascending update-id order, then advance the offset cursor to
//! `max(update_id) + 1`. The cursor only moves after the whole batch has
//! been handed off, so a crash mid-batch redelivers rather than drops.

use std::sync::Arc;
use std::time::Duration;

use tgbot_core::{BotError, Result, Transport};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use update_router::Dispatcher;

use crate::config::PollerConfig;
use crate::source::{SourceGuard, UpdateSource};

/// Consecutive categorically-fatal errors before the loop gives up.
const MAX_CONSECUTIVE_FATAL: u32 = 3;
const INITIAL_BACKOFF_SECS: u64 = 1;

/// Pull-based update source. At-least-once delivery to the dispatcher,
/// exactly-once offset acknowledgment to the remote service.
pub struct Poller {
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
    config: PollerConfig,
    guard: SourceGuard,
    cancel: CancellationToken,
    task: Option<JoinHandle<Result<()>>>,
}

impl Poller {
    pub fn new(
        transport: Arc<dyn Transport>,
        dispatcher: Dispatcher,
        config: PollerConfig,
        guard: SourceGuard,
    ) -> Self {
        Self {
            transport,
            dispatcher,
            config,
            guard,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Starts the poll loop on its own task.
    ///
    /// Fails without starting the loop when the config is invalid, another
    /// update source is active, or a webhook is still registered with the
    /// remote service (polling and webhook delivery are mutually
    /// exclusive; call delete_webhook first).
    pub async fn start(&mut self) -> Result<()> {
        self.config.validate()?;
        self.guard.acquire(UpdateSource::Polling)?;

        let webhook = match self.transport.get_webhook_info().await {
            Ok(info) => info,
            Err(e) => {
                self.guard.release(UpdateSource::Polling);
                return Err(e);
            }
        };
        if webhook.is_set() {
            self.guard.release(UpdateSource::Polling);
            return Err(BotError::Config(format!(
                "a webhook is registered at {}; delete it before polling",
                webhook.url
            )));
        }

        self.cancel = CancellationToken::new();
        let transport = self.transport.clone();
        let dispatcher = self.dispatcher.clone();
        let config = self.config.clone();
        let cancel = self.cancel.clone();
        self.task = Some(tokio::spawn(poll_loop(transport, dispatcher, config, cancel)));
        Ok(())
    }

    /// Signals the loop to exit, cancelling any in-flight long poll, and
    /// joins the loop task. Returns the loop's exit status: `Ok` for a clean
    /// stop, the fatal error if the loop already died on one.
    pub async fn stop(&mut self) -> Result<()> {
        self.cancel.cancel();
        let result = match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| BotError::Internal(format!("poll task join failed: {}", e)))?,
            None => Ok(()),
        };
        self.guard.release(UpdateSource::Polling);
        result
    }
}

async fn poll_loop(
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
    config: PollerConfig,
    cancel: CancellationToken,
) -> Result<()> {
    let mut cursor = config.initial_offset;
    let mut consecutive_fatal = 0u32;
    let mut backoff_secs = INITIAL_BACKOFF_SECS;

    info!(offset = cursor, limit = config.limit, "Poller started");
    loop {
        let batch = tokio::select! {
            _ = cancel.cancelled() => {
                info!(offset = cursor, "Poller stopped");
                return Ok(());
            }
            batch = transport.get_updates(cursor, config.limit, config.timeout_secs) => batch,
        };

        match batch {
            Ok(mut updates) => {
                consecutive_fatal = 0;
                backoff_secs = INITIAL_BACKOFF_SECS;
                if updates.is_empty() {
                    continue;
                }
                updates.sort_by_key(|u| u.update_id);
                for update in &updates {
                    dispatcher.dispatch(update).await;
                }
                // Acknowledge only after the whole batch is handed off.
                if let Some(last) = updates.last() {
                    cursor = last.update_id + 1;
                }
                debug!(
                    offset = cursor,
                    batch_size = updates.len(),
                    "Batch dispatched, cursor advanced"
                );
            }
            Err(e) => {
                if e.is_fatal() {
                    consecutive_fatal += 1;
                    error!(
                        error = %e,
                        consecutive = consecutive_fatal,
                        "Fatal polling error"
                    );
                    if consecutive_fatal >= MAX_CONSECUTIVE_FATAL {
                        error!("Giving up after repeated fatal polling errors");
                        return Err(e);
                    }
                } else {
                    consecutive_fatal = 0;
                    warn!(
                        error = %e,
                        backoff_secs,
                        "Polling error, backing off"
                    );
                }
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(offset = cursor, "Poller stopped during backoff");
                        return Ok(());
                    }
                    _ = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
                }
                backoff_secs = (backoff_secs * 2).min(config.backoff_ceiling_secs);
            }
        }
    }
}
