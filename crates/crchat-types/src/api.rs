//! Header vocabulary shared by the server and the client.
//!
//! Every operation goes to `/`; the operation is chosen by which marker header
//! is present. Names are lowercase so they can be used with
//! `HeaderName::from_static`; HTTP header matching is case-insensitive.

// -- Read markers (GET) --

pub const GET_CHAT_STATE: &str = "get-chat-state";
pub const GET_CHAT_ACTIONS: &str = "get-chat-actions";

// -- Write markers (POST) --

pub const AUTH: &str = "auth";
pub const SIGN_UP: &str = "sign-up";
pub const SEND_MESSAGE: &str = "send-message";
pub const COMMENT: &str = "comment";
/// The value of this header is the reaction kind, e.g. `Reaction: Fire`.
pub const REACTION: &str = "reaction";

// -- Arguments --

pub const LOGIN: &str = "login";
pub const PASSWORD: &str = "password";
pub const MESSAGE_ID: &str = "message-id";

/// Body returned by a successful `Auth` request.
pub fn welcome_text(login: &str) -> String {
    format!("Welcome to Comment-Reaction Chat, {}!", login)
}
