//! echo_bot: minimal runnable bot. Long-polls for text messages and echoes
//! each one back to its chat. Reads BOT_TOKEN (and optional
//! TELEGRAM_API_URL, LOG_FILE) from the environment or a .env file.

use std::sync::Arc;

use anyhow::Result;
use tgbot::{
    handler_fn, init_tracing, ApiClient, Bot, BotConfig, HandlerRegistry, PollerConfig,
    SendMessageOptions,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = BotConfig::from_env(None)?;
    init_tracing(Some(&config.log_file))?;

    let client = Arc::new(ApiClient::with_base_url(&config.token, &config.api_url)?);
    let me = client.get_me().await?;
    info!(bot = %me.username.as_deref().unwrap_or("unknown"), "Starting echo bot");

    let echo_client = client.clone();
    let registry = HandlerRegistry::new().text(
        |message| message.text.is_some(),
        handler_fn(move |update| {
            let client = echo_client.clone();
            async move {
                if let Some(message) = &update.message {
                    if let Some(text) = &message.text {
                        client
                            .send_message(message.chat.id, text, &SendMessageOptions::default())
                            .await?;
                    }
                }
                Ok(())
            }
        }),
    );

    let bot = Bot::with_transport(client, registry);
    let mut poller = bot.start_polling(PollerConfig::default()).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    poller.stop().await?;
    Ok(())
}
