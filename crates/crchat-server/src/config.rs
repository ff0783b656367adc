use std::net::SocketAddr;

use anyhow::{Context, Result};

use crchat_db::DataPaths;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data: DataPaths,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = DataPaths::default();
        let port = match lookup("CRCHAT_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("CRCHAT_PORT is not a port number: {}", raw))?,
            None => 19000,
        };

        Ok(Self {
            host: lookup("CRCHAT_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port,
            data: DataPaths {
                members: lookup("CRCHAT_MEMBERS_PATH").map_or(defaults.members, Into::into),
                actions: lookup("CRCHAT_ACTIONS_PATH").map_or(defaults.actions, Into::into),
                messages: lookup("CRCHAT_MESSAGES_PATH").map_or(defaults.messages, Into::into),
            },
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .with_context(|| format!("invalid listen address {}", raw))
    }
}
