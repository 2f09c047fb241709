mod config;
mod delivery;
mod event;
mod format;
mod server;
mod telegram;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::server::AppState;
use crate::telegram::{MessageSender, TelegramClient};

#[tokio::main]
async fn main() -> Result<()> {
    // A local .env is honored before reading the environment.
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,order_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration from environment")?;

    info!(
        "Relaying to {} Telegram chat(s): {}",
        config.chat_ids.len(),
        config.chat_ids.join(", "),
    );

    let sender: Arc<dyn MessageSender> = Arc::new(TelegramClient::new(config.bot_token.clone()));
    let state = Arc::new(AppState { config, sender });

    server::run(state).await
}
