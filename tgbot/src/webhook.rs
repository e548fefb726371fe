//! Push-based update source: an inbound HTTP endpoint the remote service
//! POSTs updates to.
//!
//! Each request carries exactly one update. Malformed bodies get a 400 and
//! are never dispatched; well-formed updates are dispatched synchronously,
//! then acknowledged with 200 regardless of handler outcome (the remote
//! service only needs receipt, not business-logic success). Requests are
//! served concurrently, so ordering across deliveries follows the remote
//! service's own behavior, not ours; use polling when strict ordering
//! matters.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tgbot_core::{InputFile, Result, Transport, Update};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use update_router::Dispatcher;

use crate::config::WebhookConfig;
use crate::source::{SourceGuard, UpdateSource};

/// Push-based update source.
pub struct WebhookReceiver {
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
    config: WebhookConfig,
    guard: SourceGuard,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for WebhookReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookReceiver").finish_non_exhaustive()
    }
}

impl WebhookReceiver {
    pub fn new(
        transport: Arc<dyn Transport>,
        dispatcher: Dispatcher,
        config: WebhookConfig,
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

    /// Registers the public URL with the remote service, uploading the
    /// configured certificate if any. Fails when a poller is active (same
    /// mutual-exclusion invariant, enforced from this side too).
    pub async fn register(&mut self) -> Result<()> {
        self.config.validate()?;
        self.guard.acquire(UpdateSource::Webhook)?;

        let certificate = self.config.certificate.as_ref().map(|path| InputFile {
            field: "certificate".to_string(),
            path: path.clone(),
        });
        if let Err(e) = self
            .transport
            .set_webhook(&self.config.public_url, certificate.as_ref())
            .await
        {
            self.guard.release(UpdateSource::Webhook);
            return Err(e);
        }
        info!(url = %self.config.public_url, "Webhook registered");
        Ok(())
    }

    /// Binds the local listener and starts serving inbound updates on its
    /// own task. Returns the bound address (port 0 resolves here).
    pub async fn serve(&mut self) -> Result<SocketAddr> {
        let app = router(self.dispatcher.clone(), &self.config.path);
        let listener = tokio::net::TcpListener::bind(self.config.listen_addr).await?;
        let addr = listener.local_addr()?;

        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        self.task = Some(tokio::spawn(async move {
            let shutdown = async move { cancel.cancelled().await };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "Webhook server failed");
            }
        }));
        info!(%addr, path = %self.config.path, "Webhook receiver listening");
        Ok(addr)
    }

    /// Deletes the webhook registration. Idempotent: the remote operation
    /// succeeds whether or not a webhook is set, and the guard release is a
    /// no-op when unheld.
    pub async fn unregister(&mut self) -> Result<()> {
        self.transport.delete_webhook().await?;
        self.guard.release(UpdateSource::Webhook);
        info!("Webhook unregistered");
        Ok(())
    }

    /// Stops the local listener and joins the server task.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Webhook server task join failed");
            }
        }
    }
}

fn router(dispatcher: Dispatcher, path: &str) -> Router {
    Router::new()
        .route(path, post(receive_update))
        .with_state(dispatcher)
}

async fn receive_update(State(dispatcher): State<Dispatcher>, body: Bytes) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Malformed webhook body dropped");
            return StatusCode::BAD_REQUEST;
        }
    };
    dispatcher.dispatch(&update).await;
    StatusCode::OK
}
