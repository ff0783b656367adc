//! Header classification.
//!
//! Each request is turned into exactly one command before any handling runs.
//! When several markers are present the first one in the order below wins.

use axum::http::{HeaderMap, HeaderName};
use thiserror::Error;

use crchat_types::api;
use crchat_types::models::ReactionKind;

/// `GET /` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCommand {
    /// Full messages document.
    ChatState,
    /// Full actions log.
    ChatActions,
}

impl ReadCommand {
    pub fn classify(headers: &HeaderMap) -> Option<Self> {
        if headers.contains_key(api::GET_CHAT_STATE) {
            Some(Self::ChatState)
        } else if headers.contains_key(api::GET_CHAT_ACTIONS) {
            Some(Self::ChatActions)
        } else {
            None
        }
    }
}

/// `POST /` operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCommand {
    Auth { login: String, password: String },
    SignUp { login: String, password: String },
    SendMessage,
    Comment { message_id: i64 },
    Reaction { kind: ReactionKind, message_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("no operation marker header")]
    NoMarker,
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("{0} header is not visible ASCII")]
    InvalidHeader(&'static str),
    #[error("message id '{0}' is not an integer")]
    InvalidMessageId(String),
    #[error("unsupported reaction '{0}'")]
    UnsupportedReaction(String),
}

impl WriteCommand {
    /// Operation name for logs. Never includes credentials.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::SignUp { .. } => "sign-up",
            Self::SendMessage => "send-message",
            Self::Comment { .. } => "comment",
            Self::Reaction { .. } => "reaction",
        }
    }

    pub fn classify(headers: &HeaderMap) -> Result<Self, ClassifyError> {
        if headers.contains_key(api::AUTH) {
            Ok(Self::Auth {
                login: required(headers, api::LOGIN)?,
                password: required(headers, api::PASSWORD)?,
            })
        } else if headers.contains_key(api::SIGN_UP) {
            Ok(Self::SignUp {
                login: required(headers, api::LOGIN)?,
                password: required(headers, api::PASSWORD)?,
            })
        } else if headers.contains_key(api::SEND_MESSAGE) {
            Ok(Self::SendMessage)
        } else if headers.contains_key(api::COMMENT) {
            Ok(Self::Comment {
                message_id: message_id(headers)?,
            })
        } else if headers.contains_key(api::REACTION) {
            // The kind is checked before anything else about the request.
            let raw = required(headers, api::REACTION)?;
            let kind = raw
                .parse::<ReactionKind>()
                .map_err(|_| ClassifyError::UnsupportedReaction(raw))?;
            Ok(Self::Reaction {
                kind,
                message_id: message_id(headers)?,
            })
        } else {
            Err(ClassifyError::NoMarker)
        }
    }
}

fn required(headers: &HeaderMap, name: &'static str) -> Result<String, ClassifyError> {
    let value = headers
        .get(HeaderName::from_static(name))
        .ok_or(ClassifyError::MissingHeader(name))?;
    value
        .to_str()
        .map(str::to_string)
        .map_err(|_| ClassifyError::InvalidHeader(name))
}

fn message_id(headers: &HeaderMap) -> Result<i64, ClassifyError> {
    let raw = required(headers, api::MESSAGE_ID)?;
    raw.trim()
        .parse()
        .map_err(|_| ClassifyError::InvalidMessageId(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(HeaderName::from_static(name), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn read_markers() {
        assert_eq!(
            ReadCommand::classify(&headers(&[("get-chat-state", "true")])),
            Some(ReadCommand::ChatState)
        );
        assert_eq!(
            ReadCommand::classify(&headers(&[("get-chat-actions", "true")])),
            Some(ReadCommand::ChatActions)
        );
        assert_eq!(
            ReadCommand::classify(&headers(&[("get-chat-state", "1"), ("get-chat-actions", "1")])),
            Some(ReadCommand::ChatState)
        );
        assert_eq!(ReadCommand::classify(&HeaderMap::new()), None);
    }

    #[test]
    fn auth_needs_credentials() {
        assert_eq!(
            WriteCommand::classify(&headers(&[("auth", "true"), ("login", "alice"), ("password", "p1")])),
            Ok(WriteCommand::Auth {
                login: "alice".into(),
                password: "p1".into()
            })
        );
        assert_eq!(
            WriteCommand::classify(&headers(&[("sign-up", "true"), ("login", "alice")])),
            Err(ClassifyError::MissingHeader("password"))
        );
    }

    #[test]
    fn first_marker_wins() {
        let cmd = WriteCommand::classify(&headers(&[
            ("send-message", "true"),
            ("comment", "true"),
            ("message-id", "0"),
        ]));
        assert_eq!(cmd, Ok(WriteCommand::SendMessage));
    }

    #[test]
    fn message_id_must_be_an_integer() {
        assert_eq!(
            WriteCommand::classify(&headers(&[("comment", "true"), ("message-id", "-3")])),
            Ok(WriteCommand::Comment { message_id: -3 })
        );
        assert_eq!(
            WriteCommand::classify(&headers(&[("comment", "true"), ("message-id", "abc")])),
            Err(ClassifyError::InvalidMessageId("abc".into()))
        );
        assert_eq!(
            WriteCommand::classify(&headers(&[("comment", "true")])),
            Err(ClassifyError::MissingHeader("message-id"))
        );
    }

    #[test]
    fn reaction_kind_is_checked_first() {
        assert_eq!(
            WriteCommand::classify(&headers(&[("reaction", "Pile of Poo"), ("message-id", "2")])),
            Ok(WriteCommand::Reaction {
                kind: ReactionKind::PileOfPoo,
                message_id: 2
            })
        );
        assert_eq!(
            WriteCommand::classify(&headers(&[("reaction", "Heart")])),
            Err(ClassifyError::UnsupportedReaction("Heart".into()))
        );
    }

    #[test]
    fn no_marker() {
        assert_eq!(
            WriteCommand::classify(&headers(&[("login", "alice")])),
            Err(ClassifyError::NoMarker)
        );
    }

    #[test]
    fn obs_text_header_is_invalid() {
        let mut map = headers(&[("auth", "true"), ("password", "p1")]);
        map.insert(HeaderName::from_static(api::LOGIN), HeaderValue::from_bytes(b"al\xe9ice").unwrap());
        assert_eq!(
            WriteCommand::classify(&map),
            Err(ClassifyError::InvalidHeader("login"))
        );
    }

    #[test]
    fn names_leave_out_credentials() {
        let cmd = WriteCommand::classify(&headers(&[("auth", "true"), ("login", "alice"), ("password", "p1")]))
            .unwrap();
        assert_eq!(cmd.name(), "auth");
        assert!(!cmd.name().contains("p1"));
    }
}
