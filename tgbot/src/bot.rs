//! Top-level facade: transport, registry, and the shared active-source
//! guard, with constructors for the two update sources.

use std::sync::Arc;

use tgbot_core::{Result, Transport};
use update_router::{Dispatcher, HandlerRegistry};

use tracing::warn;

use crate::client::ApiClient;
use crate::config::{BotConfig, PollerConfig, WebhookConfig};
use crate::poller::Poller;
use crate::source::{SourceGuard, UpdateSource};
use crate::webhook::WebhookReceiver;

/// Bot instance: one transport, one immutable handler table, and at most
/// one active update source at a time. Register all handlers before
/// starting a source; the registry cannot change during a run.
pub struct Bot {
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
    guard: SourceGuard,
}

impl Bot {
    /// Creates a bot over the real HTTP transport.
    pub fn new(config: &BotConfig, registry: HandlerRegistry) -> Result<Self> {
        config.validate()?;
        let client = ApiClient::with_base_url(&config.token, &config.api_url)?;
        Ok(Self::with_transport(Arc::new(client), registry))
    }

    /// Creates a bot over any transport (tests inject scripted ones here).
    pub fn with_transport(transport: Arc<dyn Transport>, registry: HandlerRegistry) -> Self {
        Self {
            transport,
            dispatcher: Dispatcher::new(registry),
            guard: SourceGuard::new(),
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Builds and starts a poller. Fails if the other source is active or a
    /// webhook is registered remotely.
    pub async fn start_polling(&self, config: PollerConfig) -> Result<Poller> {
        let mut poller = Poller::new(
            self.transport.clone(),
            self.dispatcher.clone(),
            config,
            self.guard.clone(),
        );
        poller.start().await?;
        Ok(poller)
    }

    /// Builds a webhook receiver, registers the public URL, and starts the
    /// local listener. Fails if a poller is active. A serve failure rolls
    /// the registration back so the source slot stays usable.
    pub async fn start_webhook(&self, config: WebhookConfig) -> Result<WebhookReceiver> {
        let mut receiver = WebhookReceiver::new(
            self.transport.clone(),
            self.dispatcher.clone(),
            config,
            self.guard.clone(),
        );
        receiver.register().await?;
        if let Err(e) = receiver.serve().await {
            if let Err(cleanup) = receiver.unregister().await {
                warn!(error = %cleanup, "Failed to delete webhook while rolling back");
                self.guard.release(UpdateSource::Webhook);
            }
            return Err(e);
        }
        Ok(receiver)
    }

    /// Removes any webhook registration so polling can start.
    pub async fn delete_webhook(&self) -> Result<()> {
        self.transport.delete_webhook().await
    }
}
