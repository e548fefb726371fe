//! Pattern table mapping inbound updates to handlers.
//!
//! Registration happens once at startup (builder methods consume and return
//! `self`); the table is immutable while update sources run, so concurrent
//! lookups from webhook request tasks need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use tgbot_core::{Message, Update, UpdateKind};

use crate::command::command_token;
use crate::handler::UpdateHandler;

type Predicate = dyn Fn(&Message) -> bool + Send + Sync;
type CallbackPredicate = dyn Fn(&str) -> bool + Send + Sync;

/// Ordered table of handler entries, consulted by the dispatcher.
///
/// Match priority for message kinds: exact command > command prefix >
/// free-text predicate (registration order). First match wins; an update
/// routes to zero or one handler.
#[derive(Default)]
pub struct HandlerRegistry {
    commands: Vec<(String, Arc<dyn UpdateHandler>)>,
    command_prefixes: Vec<(String, Arc<dyn UpdateHandler>)>,
    text: Vec<(Box<Predicate>, Arc<dyn UpdateHandler>)>,
    callbacks: Vec<(String, Arc<dyn UpdateHandler>)>,
    callback_matchers: Vec<(Box<CallbackPredicate>, Arc<dyn UpdateHandler>)>,
    kinds: HashMap<UpdateKind, Arc<dyn UpdateHandler>>,
    fallback: Option<Arc<dyn UpdateHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry (no entries, no fallback).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an exact command token, e.g. `/start`.
    /// Matching is case-sensitive; a `/start@botname` form matches too.
    pub fn command(mut self, command: impl Into<String>, handler: Arc<dyn UpdateHandler>) -> Self {
        self.commands.push((command.into(), handler));
        self
    }

    /// Registers a handler for commands starting with `prefix`, e.g.
    /// `/admin` matching `/admin_add`. Consulted after exact commands.
    pub fn command_prefix(
        mut self,
        prefix: impl Into<String>,
        handler: Arc<dyn UpdateHandler>,
    ) -> Self {
        self.command_prefixes.push((prefix.into(), handler));
        self
    }

    /// Registers a free-text predicate, tested in registration order against
    /// non-command messages. `|_| true` acts as a message catch-all.
    pub fn text<P>(mut self, predicate: P, handler: Arc<dyn UpdateHandler>) -> Self
    where
        P: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.text.push((Box::new(predicate), handler));
        self
    }

    /// Registers a handler for an exact callback-data payload.
    pub fn callback(mut self, data: impl Into<String>, handler: Arc<dyn UpdateHandler>) -> Self {
        self.callbacks.push((data.into(), handler));
        self
    }

    /// Registers a callback-data predicate, tested in registration order
    /// after exact callback entries.
    pub fn callback_matcher<P>(mut self, predicate: P, handler: Arc<dyn UpdateHandler>) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.callback_matchers.push((Box::new(predicate), handler));
        self
    }

    /// Registers the single handler for a non-message update kind
    /// (inline query, poll, ...). A later registration for the same kind
    /// replaces the earlier one.
    pub fn on(mut self, kind: UpdateKind, handler: Arc<dyn UpdateHandler>) -> Self {
        self.kinds.insert(kind, handler);
        self
    }

    /// Registers the catch-all hook for updates no other entry matches.
    /// Without it, unrouted updates are silently dropped.
    pub fn fallback(mut self, handler: Arc<dyn UpdateHandler>) -> Self {
        self.fallback = Some(handler);
        self
    }

    /// Returns the first entry matching `update` per the priority order, or
    /// the fallback, or `None`.
    pub fn match_update(&self, update: &Update) -> Option<&Arc<dyn UpdateHandler>> {
        let matched = match update.kind() {
            UpdateKind::Message | UpdateKind::EditedMessage => {
                self.match_message(update.message_payload()?)
            }
            UpdateKind::CallbackQuery => {
                let data = update.callback_query.as_ref()?.data.as_deref();
                data.and_then(|data| self.match_callback(data))
            }
            UpdateKind::Unknown => None,
            kind => self.kinds.get(&kind),
        };
        matched.or(self.fallback.as_ref())
    }

    fn match_message(&self, message: &Message) -> Option<&Arc<dyn UpdateHandler>> {
        let text = message.text.as_deref()?;
        match command_token(text) {
            Some(token) => self
                .commands
                .iter()
                .find(|(cmd, _)| cmd.as_str() == token)
                .or_else(|| {
                    self.command_prefixes
                        .iter()
                        .find(|(prefix, _)| token.starts_with(prefix.as_str()))
                })
                .map(|(_, handler)| handler),
            None => self
                .text
                .iter()
                .find(|(predicate, _)| predicate(message))
                .map(|(_, handler)| handler),
        }
    }

    fn match_callback(&self, data: &str) -> Option<&Arc<dyn UpdateHandler>> {
        self.callbacks
            .iter()
            .find(|(exact, _)| exact.as_str() == data)
            .map(|(_, handler)| handler)
            .or_else(|| {
                self.callback_matchers
                    .iter()
                    .find(|(predicate, _)| predicate(data))
                    .map(|(_, handler)| handler)
            })
    }
}
