//! # tgbot-core
//!
//! Core types and traits for the bot engine: the [`Update`] wire model,
//! the [`Transport`] seam, the error taxonomy, and tracing initialization.
//! Transport-agnostic; consumed by update-router and tgbot.

pub mod error;
pub mod logger;
pub mod transport;
pub mod types;

pub use error::{BotError, Result};
pub use logger::init_tracing;
pub use transport::{InputFile, Transport};
pub use types::{
    CallbackQuery, Chat, ChosenInlineResult, InlineQuery, Message, Poll, PollAnswer,
    PreCheckoutQuery, ShippingQuery, Update, UpdateKind, User, WebhookInfo,
};
