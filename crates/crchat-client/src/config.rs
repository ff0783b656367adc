use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub ui_path: PathBuf,
    pub actions_cache: PathBuf,
    pub messages_cache: PathBuf,
    pub log_path: PathBuf,
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let poll_ms: u64 = match lookup("CRCHAT_POLL_INTERVAL_MS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("CRCHAT_POLL_INTERVAL_MS is not a number: {}", raw))?,
            None => 500,
        };
        let path = |key: &str, default: &str| -> PathBuf { lookup(key).unwrap_or_else(|| default.into()).into() };

        Ok(Self {
            server_url: lookup("CRCHAT_SERVER_URL").unwrap_or_else(|| "http://127.0.0.1:19000".into()),
            ui_path: path("CRCHAT_UI_PATH", "ui.txt"),
            actions_cache: path("CRCHAT_ACTIONS_CACHE", "data/client/actions.json"),
            messages_cache: path("CRCHAT_MESSAGES_CACHE", "data/client/messages.json"),
            log_path: path("CRCHAT_LOG_PATH", "log/log_client"),
            poll_interval: Duration::from_millis(poll_ms),
        })
    }
}
