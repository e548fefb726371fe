//! Mutual exclusion between update sources.
//!
//! At most one source (poller or webhook receiver) may be active per bot
//! instance. Both sides share one [`SourceGuard`] and acquire it before
//! touching the remote service, so the invariant is enforced at registration
//! time rather than by convention.

use std::sync::{Arc, Mutex};

use tgbot_core::{BotError, Result};

/// Which update source is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    Polling,
    Webhook,
}

impl std::fmt::Display for UpdateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateSource::Polling => write!(f, "polling"),
            UpdateSource::Webhook => write!(f, "webhook"),
        }
    }
}

/// Shared claim on "the active update source". Cloning shares the claim.
#[derive(Clone, Default)]
pub struct SourceGuard {
    active: Arc<Mutex<Option<UpdateSource>>>,
}

impl SourceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the active slot for `source`. Fails when any source already
    /// holds it.
    pub fn acquire(&self, source: UpdateSource) -> Result<()> {
        let mut active = self.active.lock().expect("source guard poisoned");
        match *active {
            Some(current) => Err(BotError::Config(format!(
                "cannot start {} update source: {} is already active",
                source, current
            ))),
            None => {
                *active = Some(source);
                Ok(())
            }
        }
    }

    /// Releases the slot if `source` holds it. Releasing an unheld slot is a
    /// no-op, which keeps stop paths idempotent.
    pub fn release(&self, source: UpdateSource) {
        let mut active = self.active.lock().expect("source guard poisoned");
        if *active == Some(source) {
            *active = None;
        }
    }

    pub fn active(&self) -> Option<UpdateSource> {
        *self.active.lock().expect("source guard poisoned")
    }
}
