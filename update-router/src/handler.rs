//! The [`UpdateHandler`] trait and the closure adapter [`handler_fn`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tgbot_core::{Result, Update};

/// Caller-supplied logic invoked when an update matches a registered
/// pattern. Handlers run on the dispatching task (poller loop or webhook
/// request task); bodies must be safe for concurrent execution when the
/// webhook source is used.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, update: &Update) -> Result<()>;
}

/// Adapter so plain async closures can be registered without a trait impl.
struct FnHandler {
    f: Box<dyn Fn(Update) -> BoxFuture<'static, Result<()>> + Send + Sync>,
}

#[async_trait]
impl UpdateHandler for FnHandler {
    async fn handle(&self, update: &Update) -> Result<()> {
        (self.f)(update.clone()).await
    }
}

/// Wraps an async closure as an [`UpdateHandler`].
///
/// The closure receives an owned [`Update`] so the returned future can be
/// `'static` (required when handlers run on spawned tasks).
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn UpdateHandler>
where
    F: Fn(Update) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnHandler {
        f: Box::new(move |update| Box::pin(f(update))),
    })
}
