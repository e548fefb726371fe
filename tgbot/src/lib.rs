//! # tgbot
//!
//! Update acquisition and dispatch engine for a messaging-bot API: a
//! long-polling [`Poller`] with offset acknowledgment, a push-based
//! [`WebhookReceiver`], and the [`Bot`] facade wiring either source to a
//! handler registry. Wire types and the transport seam come from
//! `tgbot-core`; routing comes from `update-router`. Both are re-exported
//! here.
//!
//! Offset state is process-lifetime only: a deployment that needs
//! crash-safe exactly-once delivery must persist the last-acknowledged
//! update id itself.

pub mod bot;
pub mod client;
pub mod config;
pub mod poller;
pub mod source;
pub mod webhook;

pub use bot::Bot;
pub use client::{ApiClient, ParseMode, SendMessageOptions};
pub use config::{BotConfig, PollerConfig, WebhookConfig};
pub use poller::Poller;
pub use source::{SourceGuard, UpdateSource};
pub use webhook::WebhookReceiver;

pub use tgbot_core::{
    init_tracing, BotError, CallbackQuery, Chat, InputFile, Message, Result, Transport, Update,
    UpdateKind, User, WebhookInfo,
};
pub use update_router::{handler_fn, DispatchOutcome, Dispatcher, HandlerRegistry, UpdateHandler};
