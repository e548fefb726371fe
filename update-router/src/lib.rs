//! # update-router
//!
//! Handler registry and dispatcher for inbound updates. Patterns (exact
//! command, command prefix, free-text predicate, callback data, update kind)
//! are registered once at startup; the dispatcher then routes each update to
//! at most one handler, containing handler failures so the update stream
//! keeps flowing.

mod command;
mod dispatch;
mod handler;
mod registry;

pub use command::command_token;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use handler::{handler_fn, UpdateHandler};
pub use registry::HandlerRegistry;
