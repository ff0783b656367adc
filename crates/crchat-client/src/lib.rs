//! Console client: talks to the chat server, mirrors its documents locally and
//! renders them to the terminal and to a transcript file.

pub mod client;
pub mod command;
pub mod config;
pub mod managers;
pub mod poller;
pub mod render;

use thiserror::Error;

use crchat_db::StoreError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed document from server: {0}")]
    Document(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("transcript write failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
