use std::net::IpAddr;

use axum::{http::StatusCode, response::Response};
use tracing::info;

use crchat_db::MessageOutcome;
use crchat_types::models::NewAction;

use crate::auth::AppState;
use crate::{respond, with_store};

pub async fn get_chat_state(state: &AppState) -> Result<Response, StatusCode> {
    info!("Handling get chat state");
    let body = with_store(state, |store| store.messages.get_serialized()).await?;
    Ok(respond(StatusCode::OK, body))
}

pub async fn get_chat_actions(state: &AppState) -> Result<Response, StatusCode> {
    info!("Handling get chat actions");
    let body = with_store(state, |store| store.actions.get_serialized()).await?;
    Ok(respond(StatusCode::OK, body))
}

pub async fn send_message(state: &AppState, addr: IpAddr, body: String) -> Result<Response, StatusCode> {
    let login = state.sessions.require(addr).await?;
    with_store(state, move |store| {
        let item = NewAction::message(login, store.messages.size()? as i64, body);
        store.record(&item).map(|_| ())
    })
    .await?;
    Ok(respond(StatusCode::OK, String::new()))
}

pub async fn comment(
    state: &AppState,
    addr: IpAddr,
    message_id: i64,
    body: String,
) -> Result<Response, StatusCode> {
    let login = state.sessions.require(addr).await?;
    record(state, NewAction::comment(login, message_id, body)).await?;
    Ok(respond(StatusCode::OK, String::new()))
}

pub(crate) async fn record(state: &AppState, item: NewAction) -> Result<MessageOutcome, StatusCode> {
    with_store(state, move |store| store.record(&item).map(|(outcome, _)| outcome)).await
}
