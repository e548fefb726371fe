//! Routes one update to its matched handler and contains handler failures.

use std::sync::Arc;

use tgbot_core::Update;
use tracing::{debug, error};

use crate::registry::HandlerRegistry;

/// What happened to a dispatched update. Informational only; the update
/// stream continues regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler matched and completed.
    Handled,
    /// A handler matched and returned an error (already logged).
    HandlerFailed,
    /// No entry matched and no fallback is registered.
    NoMatch,
}

/// Stateless router over an immutable [`HandlerRegistry`].
///
/// Holds no mutable state, so concurrent invocation from multiple webhook
/// request tasks is safe. Handler errors are logged here and never
/// propagate to the update source; redelivered update ids are not
/// deduplicated, so an at-least-once source invokes handlers again.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Finds and invokes the handler for `update`. One failing handler must
    /// never stop the stream, so errors end here.
    pub async fn dispatch(&self, update: &Update) -> DispatchOutcome {
        let kind = update.kind();
        let Some(handler) = self.registry.match_update(update) else {
            debug!(update_id = update.update_id, ?kind, "No handler matched, update dropped");
            return DispatchOutcome::NoMatch;
        };

        debug!(update_id = update.update_id, ?kind, "Dispatching update");
        match handler.handle(update).await {
            Ok(()) => DispatchOutcome::Handled,
            Err(e) => {
                error!(
                    update_id = update.update_id,
                    ?kind,
                    error = %e,
                    "Handler failed"
                );
                DispatchOutcome::HandlerFailed
            }
        }
    }
}
