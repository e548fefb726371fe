//! Integration tests for [`tgbot::WebhookReceiver`]: request handling over a
//! real listener, mutual exclusion against the poller, and idempotent
//! unregistration.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::mock_transport::{text_update, MockTransport};
use tgbot::{
    handler_fn, Bot, BotError, Dispatcher, HandlerRegistry, PollerConfig, SourceGuard,
    UpdateSource, WebhookConfig, WebhookReceiver,
};

fn test_config() -> WebhookConfig {
    WebhookConfig::new(
        "https://bot.example.com/webhook",
        "127.0.0.1:0".parse().unwrap(),
    )
}

fn counting_dispatcher(count: Arc<AtomicUsize>) -> Dispatcher {
    let registry = HandlerRegistry::new().text(
        |_| true,
        handler_fn(move |_| {
            let count = count.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }),
    );
    Dispatcher::new(registry)
}

/// **Test: Well-formed bodies dispatch and get 200; malformed bodies get
/// 400 without dispatch; a failing handler still gets 200.**
///
/// **Setup:** Receiver serving on a random port; catch-all counter plus a
/// `/fail` handler that errors.
/// **Action:** POST a valid update, a garbage body, and a `/fail` update.
/// **Expected:** 200/400/200; the counter reflects only the valid update.
#[tokio::test]
async fn test_request_handling() {
    let count = Arc::new(AtomicUsize::new(0));
    let count_in_handler = count.clone();
    let registry = HandlerRegistry::new()
        .command(
            "/fail",
            handler_fn(|_| async { Err(BotError::Handler("boom".to_string())) }),
        )
        .text(
            |_| true,
            handler_fn(move |_| {
                let count = count_in_handler.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

    let transport = Arc::new(MockTransport::new());
    let mut receiver = WebhookReceiver::new(
        transport.clone(),
        Dispatcher::new(registry),
        test_config(),
        SourceGuard::new(),
    );
    receiver.register().await.unwrap();
    assert_eq!(transport.set_webhook_calls(), 1);
    let addr = receiver.serve().await.unwrap();
    let endpoint = format!("http://{}/webhook", addr);
    let client = reqwest::Client::new();

    let body = serde_json::to_string(&text_update(1, "hello")).unwrap();
    let response = client.post(&endpoint).body(body).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(count.load(Ordering::SeqCst), 1);

    let response = client
        .post(&endpoint)
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(count.load(Ordering::SeqCst), 1);

    let body = serde_json::to_string(&text_update(2, "/fail")).unwrap();
    let response = client.post(&endpoint).body(body).send().await.unwrap();
    assert_eq!(response.status(), 200, "handler failure must still ack");

    receiver.unregister().await.unwrap();
    receiver.stop().await;
}

/// **Test: Registering the webhook while a poller is active fails without
/// touching the remote service.**
///
/// **Setup:** Guard pre-acquired for polling.
/// **Action:** `receiver.register()`.
/// **Expected:** Config error; no setWebhook call.
#[tokio::test]
async fn test_register_fails_while_poller_active() {
    let transport = Arc::new(MockTransport::new());
    let guard = SourceGuard::new();
    guard.acquire(UpdateSource::Polling).unwrap();

    let mut receiver = WebhookReceiver::new(
        transport.clone(),
        counting_dispatcher(Arc::new(AtomicUsize::new(0))),
        test_config(),
        guard,
    );
    assert!(matches!(
        receiver.register().await,
        Err(BotError::Config(_))
    ));
    assert_eq!(transport.set_webhook_calls(), 0);
}

/// **Test: `unregister()` is idempotent.**
///
/// **Setup:** Receiver that never registered.
/// **Action:** Call `unregister()` twice.
/// **Expected:** Both calls succeed; deleteWebhook issued each time.
#[tokio::test]
async fn test_unregister_is_idempotent() {
    let transport = Arc::new(MockTransport::new());
    let mut receiver = WebhookReceiver::new(
        transport.clone(),
        counting_dispatcher(Arc::new(AtomicUsize::new(0))),
        test_config(),
        SourceGuard::new(),
    );

    receiver.unregister().await.unwrap();
    receiver.unregister().await.unwrap();
    assert_eq!(transport.delete_webhook_calls(), 2);
}

/// **Test: A serve failure after registration rolls back and frees the
/// source slot.**
///
/// **Setup:** A listener already bound on the webhook's listen address, so
/// `serve()` fails with address-in-use after `setWebhook` succeeded.
/// **Action:** `bot.start_webhook(config)`, then `bot.start_polling(...)`.
/// **Expected:** The webhook start returns an IO error, the remote webhook
/// is deleted during rollback, and polling starts normally afterwards.
#[tokio::test]
async fn test_serve_failure_releases_source_slot() {
    let blocker = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = blocker.local_addr().unwrap();

    let transport = Arc::new(MockTransport::new());
    let registry = HandlerRegistry::new().text(|_| true, handler_fn(|_| async { Ok(()) }));
    let bot = Bot::with_transport(transport.clone(), registry);

    let mut config = test_config();
    config.listen_addr = addr;
    let err = bot.start_webhook(config).await.unwrap_err();
    assert!(matches!(err, BotError::Io(_)), "got {:?}", err);
    assert_eq!(transport.set_webhook_calls(), 1);
    assert_eq!(transport.delete_webhook_calls(), 1);

    let mut poller = bot.start_polling(PollerConfig::default()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(poller.stop().await.is_ok());
}

/// **Test: The facade enforces one active source, both ways, across a full
/// webhook-then-polling cycle.**
///
/// **Setup:** `Bot` over the mock transport with a catch-all handler.
/// **Action:** Start the webhook source, try to start polling (must fail),
/// tear the webhook down, then start polling (must succeed).
/// **Expected:** Errors and successes as above; polling stops cleanly.
#[tokio::test]
async fn test_facade_source_mutual_exclusion() {
    let transport = Arc::new(MockTransport::new());
    let registry = HandlerRegistry::new().text(|_| true, handler_fn(|_| async { Ok(()) }));
    let bot = Bot::with_transport(transport.clone(), registry);

    let mut receiver = bot.start_webhook(test_config()).await.unwrap();
    assert!(matches!(
        bot.start_polling(PollerConfig::default()).await,
        Err(BotError::Config(_))
    ));

    receiver.unregister().await.unwrap();
    receiver.stop().await;

    let mut poller = bot.start_polling(PollerConfig::default()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(poller.stop().await.is_ok());
}
