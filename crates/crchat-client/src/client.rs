use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use tracing::info;

use crchat_types::api;
use crchat_types::models::{Action, Message, ReactionKind};

use crate::{ClientError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    Registered,
    LoginTaken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Carries the server's welcome text.
    Welcome(String),
    Rejected,
}

/// HTTP access to one chat server. The server tracks the session by our
/// address, so there is no token to carry between calls.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn sign_up(&self, login: &str, password: &str) -> Result<SignUpOutcome> {
        let request = self
            .http
            .post(&self.base_url)
            .header(api::SIGN_UP, "true")
            .header(api::LOGIN, login)
            .header(api::PASSWORD, password);
        match send(request).await? {
            (StatusCode::OK, _) => Ok(SignUpOutcome::Registered),
            (StatusCode::BAD_REQUEST, _) => Ok(SignUpOutcome::LoginTaken),
            (status, _) => Err(ClientError::Status(status)),
        }
    }

    pub async fn sign_in(&self, login: &str, password: &str) -> Result<SignInOutcome> {
        let request = self
            .http
            .post(&self.base_url)
            .header(api::AUTH, "true")
            .header(api::LOGIN, login)
            .header(api::PASSWORD, password);
        match send(request).await? {
            (StatusCode::OK, body) => Ok(SignInOutcome::Welcome(body)),
            (StatusCode::UNAUTHORIZED, _) => Ok(SignInOutcome::Rejected),
            (status, _) => Err(ClientError::Status(status)),
        }
    }

    pub async fn send_message(&self, text: &str) -> Result<()> {
        info!("Sending message: {}", text);
        let request = self
            .http
            .post(&self.base_url)
            .header(api::SEND_MESSAGE, "true")
            .body(text.to_string());
        expect_ok(send(request).await?)
    }

    pub async fn send_comment(&self, message_id: i64, text: &str) -> Result<()> {
        info!("Sending comment to message {}: {}", message_id, text);
        let request = self
            .http
            .post(&self.base_url)
            .header(api::COMMENT, "true")
            .header(api::MESSAGE_ID, message_id.to_string())
            .body(text.to_string());
        expect_ok(send(request).await?)
    }

    pub async fn send_reaction(&self, message_id: i64, kind: ReactionKind) -> Result<()> {
        info!("Sending reaction to message {}: {}", message_id, kind);
        let request = self
            .http
            .post(&self.base_url)
            .header(api::REACTION, kind.as_str())
            .header(api::MESSAGE_ID, message_id.to_string());
        expect_ok(send(request).await?)
    }

    pub async fn fetch_messages(&self) -> Result<Vec<Message>> {
        let request = self.http.get(&self.base_url).header(api::GET_CHAT_STATE, "true");
        let body = expect_body(send(request).await?)?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn fetch_actions(&self) -> Result<Vec<Action>> {
        let request = self.http.get(&self.base_url).header(api::GET_CHAT_ACTIONS, "true");
        let body = expect_body(send(request).await?)?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn send(request: RequestBuilder) -> Result<(StatusCode, String)> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    info!("Status: {}, body: {} bytes", status, body.len());
    Ok((status, body))
}

fn expect_ok(reply: (StatusCode, String)) -> Result<()> {
    expect_body(reply).map(|_| ())
}

fn expect_body((status, body): (StatusCode, String)) -> Result<String> {
    if status == StatusCode::OK {
        Ok(body)
    } else {
        Err(ClientError::Status(status))
    }
}
