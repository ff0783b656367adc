use std::net::IpAddr;

use axum::{http::StatusCode, response::Response};
use tracing::debug;

use crchat_types::models::{NewAction, ReactionKind};

use crate::auth::AppState;
use crate::messages::record;
use crate::respond;

/// The kind has already been validated by the classifier, so an unsupported
/// reaction never reaches the session check.
pub async fn react(
    state: &AppState,
    addr: IpAddr,
    kind: ReactionKind,
    message_id: i64,
) -> Result<Response, StatusCode> {
    let login = state.sessions.require(addr).await?;
    let outcome = record(state, NewAction::reaction(login, message_id, kind)).await?;
    debug!("Reaction {} on {} from {}: {:?}", kind, message_id, addr, outcome);
    Ok(respond(StatusCode::OK, String::new()))
}
