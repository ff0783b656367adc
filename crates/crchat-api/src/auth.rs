use std::net::IpAddr;
use std::sync::Arc;

use axum::{http::StatusCode, response::Response};
use tracing::info;

use crchat_db::ChatStore;
use crchat_types::api::welcome_text;
use crchat_types::models::NewAction;

use crate::sessions::Sessions;
use crate::{respond, with_store};

pub type AppState = Arc<AppStateInner>;

/// Everything a request handler may touch. Built once at startup.
pub struct AppStateInner {
    pub store: ChatStore,
    pub sessions: Sessions,
}

impl AppStateInner {
    pub fn new(store: ChatStore) -> AppState {
        Arc::new(Self {
            store,
            sessions: Sessions::new(),
        })
    }
}

pub async fn auth(
    state: &AppState,
    addr: IpAddr,
    login: String,
    password: String,
) -> Result<Response, StatusCode> {
    let ok = {
        let login = login.clone();
        with_store(state, move |store| store.members.auth(&login, &password)).await?
    };

    if !ok {
        info!("Incorrect credentials for login {} from {}", login, addr);
        return Err(StatusCode::UNAUTHORIZED);
    }

    state.sessions.bind(addr, login.clone()).await;
    info!("Auth with login {} from {} OK", login, addr);
    Ok(respond(StatusCode::OK, welcome_text(&login)))
}

pub async fn sign_up(
    state: &AppState,
    addr: IpAddr,
    login: String,
    password: String,
) -> Result<Response, StatusCode> {
    let item = NewAction::sign_up(login.clone(), password);

    let registered = with_store(state, move |store| {
        if store.members.is_login_used(&item.login)? || !store.members.add(&item)? {
            return Ok(false);
        }
        store.actions.add(&item)?;
        Ok(true)
    })
    .await?;

    if !registered {
        info!("Registration: login {} is already used", login);
        return Err(StatusCode::BAD_REQUEST);
    }

    state.sessions.bind(addr, login).await;
    Ok(respond(StatusCode::OK, String::new()))
}
