pub mod auth;
pub mod command;
pub mod messages;
pub mod reactions;
pub mod sessions;

use std::net::SocketAddr;

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{debug, error, warn};

use crchat_db::ChatStore;

pub use auth::{AppState, AppStateInner};
use command::{ReadCommand, WriteCommand};

/// Every operation is served from `/`; the headers pick the operation.
///
/// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`,
/// sessions are keyed by the peer address.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_chat).post(write_chat))
        .with_state(state)
}

async fn read_chat(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = match ReadCommand::classify(&headers) {
        Some(ReadCommand::ChatState) => messages::get_chat_state(&state).await,
        Some(ReadCommand::ChatActions) => messages::get_chat_actions(&state).await,
        None => {
            debug!("GET without a read marker");
            Err(StatusCode::NOT_FOUND)
        }
    };
    result.unwrap_or_else(|status| respond(status, String::new()))
}

async fn write_chat(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = match String::from_utf8(body.to_vec()) {
        Ok(body) => body,
        Err(e) => {
            warn!("Rejected request from {}: body is not UTF-8: {}", peer, e);
            return respond(StatusCode::BAD_REQUEST, String::new());
        }
    };

    let command = match WriteCommand::classify(&headers) {
        Ok(command) => command,
        Err(e) => {
            warn!("Rejected request from {}: {}", peer, e);
            return respond(StatusCode::BAD_REQUEST, String::new());
        }
    };
    debug!("POST from {}: {}, {} byte body", peer, command.name(), body.len());

    let addr = peer.ip();
    let result = match command {
        WriteCommand::Auth { login, password } => auth::auth(&state, addr, login, password).await,
        WriteCommand::SignUp { login, password } => auth::sign_up(&state, addr, login, password).await,
        WriteCommand::SendMessage => messages::send_message(&state, addr, body).await,
        WriteCommand::Comment { message_id } => messages::comment(&state, addr, message_id, body).await,
        WriteCommand::Reaction { kind, message_id } => reactions::react(&state, addr, kind, message_id).await,
    };
    result.unwrap_or_else(|status| respond(status, String::new()))
}

/// All responses are `text/html`, whatever the body.
pub(crate) fn respond(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/html")], body).into_response()
}

/// Run blocking document I/O off the async runtime.
pub(crate) async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&ChatStore) -> crchat_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.store))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("Store error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
