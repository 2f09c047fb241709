use anyhow::{Context, Result};

/// Immutable process configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret every webhook caller must present.
    pub secret: String,
    /// Telegram Bot API token.
    pub bot_token: String,
    /// Destination chat ids, in delivery order.
    pub chat_ids: Vec<String>,
    /// Port the HTTP server listens on.
    pub port: u16,
}

fn default_secret() -> String {
    "default-secret".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Split a comma-separated chat id list: entries trimmed, empty entries
/// dropped, order preserved.
pub fn parse_chat_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("SECRET").unwrap_or_else(|_| default_secret());

        let bot_token = std::env::var("TELEGRAM_TOKEN")
            .context("TELEGRAM_TOKEN is not set")?;

        let chat_ids = parse_chat_ids(&std::env::var("CHAT_ID").unwrap_or_default());

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid PORT value: {raw}"))?,
            Err(_) => default_port(),
        };

        Ok(Self {
            secret,
            bot_token,
            chat_ids,
            port,
        })
    }
}
